use thiserror::Error;

use crate::ProductId;

/// Errors that can occur when interacting with the product/order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The product is still referenced by at least one order item.
    #[error("Product {0} is referenced by existing orders")]
    ProductReferenced(ProductId),

    /// A stored row could not be decoded into a domain value.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
