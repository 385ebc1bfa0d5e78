//! Domain error types.

use common::{OrderId, ProductId};
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during catalog and order operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced product does not exist.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    /// The order does not exist.
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: OrderId },

    /// A line asked for more units than the product has left.
    #[error(
        "Not enough stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// The request itself is malformed or not allowed.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The product cannot be deleted while orders reference it.
    #[error("Product {product_id} is referenced by existing orders")]
    ProductInUse { product_id: ProductId },

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        DomainError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::ProductNotFound { .. } => "product_not_found",
            DomainError::OrderNotFound { .. } => "order_not_found",
            DomainError::InsufficientStock { .. } => "insufficient_stock",
            DomainError::InvalidInput { .. } => "invalid_input",
            DomainError::ProductInUse { .. } => "product_in_use",
            DomainError::Store(_) => "store",
        }
    }
}
