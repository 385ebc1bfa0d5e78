pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::{OrderId, OrderStatus, ProductId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use model::{NewOrder, NewProduct, Order, OrderItem, Product};
pub use postgres::PostgresStore;
pub use query::ListQuery;
pub use store::{OrderStore, ProductStore, Store, UnitOfWork};
