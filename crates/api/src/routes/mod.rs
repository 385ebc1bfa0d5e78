//! HTTP route handlers and the state they share.

pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use domain::{ListQuery, OrderService, ProductCatalog};
use serde::Deserialize;
use store::Store;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub orders: OrderService<S>,
    pub catalog: ProductCatalog<S>,
}

/// `?offset=&limit=` query parameters for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl From<Pagination> for ListQuery {
    fn from(page: Pagination) -> Self {
        ListQuery {
            limit: page.limit,
            offset: page.offset,
        }
    }
}
