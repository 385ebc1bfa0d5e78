//! Domain layer for the inventory and order service.
//!
//! This crate provides:
//! - `OrderPlacementEngine`: all-or-nothing stock reservation and order creation
//! - `OrderStatusManager`: order lifecycle transitions under a `TransitionPolicy`
//! - `ProductCatalog`: validated product CRUD
//! - `OrderService`: facade over placement, status changes and order reads

pub mod catalog;
pub mod error;
pub mod placement;
pub mod service;
pub mod status;

pub use catalog::ProductCatalog;
pub use common::{OrderId, OrderStatus, ProductId};
pub use error::DomainError;
pub use placement::{OrderLine, OrderPlacementEngine};
pub use service::OrderService;
pub use status::{OrderStatusManager, ParsePolicyError, TransitionPolicy};
pub use store::{ListQuery, NewProduct, Order, OrderItem, Product};
