//! Shared types for the inventory and order service.

pub mod status;
pub mod types;

pub use status::{OrderStatus, ParseStatusError};
pub use types::{OrderId, ParseIdError, ProductId};
