use async_trait::async_trait;

use crate::{
    ListQuery, NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, ProductId, Result,
};

/// Plain product persistence.
///
/// Every method is its own short transaction and serializes with open
/// units of work, so a direct update can never interleave with a reservation.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts a product and returns it with its assigned id.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    /// Retrieves a product by id.
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>>;

    /// Lists products in id order.
    async fn list_products(&self, query: ListQuery) -> Result<Vec<Product>>;

    /// Replaces every field of a product.
    ///
    /// Returns None if the product doesn't exist.
    async fn update_product(
        &self,
        product_id: ProductId,
        product: NewProduct,
    ) -> Result<Option<Product>>;

    /// Deletes a product and returns the removed record.
    ///
    /// Fails with `ProductReferenced` if an order item still points at it.
    async fn delete_product(&self, product_id: ProductId) -> Result<Option<Product>>;
}

/// Read access to placed orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Retrieves an order with its items.
    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Lists orders with their items, in id order.
    async fn list_orders(&self, query: ListQuery) -> Result<Vec<Order>>;
}

/// A transaction scope over the store.
///
/// Writes made through a unit of work become visible only on `commit`.
/// Dropping it without committing discards every write and releases any
/// locks it holds.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Locks the given products for the rest of the unit and returns the
    /// ones that exist, in id order.
    ///
    /// Callers should pass ids sorted ascending so concurrent units acquire
    /// row locks in the same order.
    async fn lock_products(&mut self, product_ids: &[ProductId]) -> Result<Vec<Product>>;

    /// Decrements a product's quantity.
    ///
    /// Returns the new quantity, or None if the product is missing or the
    /// decrement would leave it negative. Nothing changes in that case.
    async fn decrement_quantity(&mut self, product_id: ProductId, amount: i64)
    -> Result<Option<i64>>;

    /// Inserts an order with status `in_process` and returns it.
    async fn insert_order(&mut self, order: NewOrder) -> Result<Order>;

    /// Locks an order for the rest of the unit and returns it.
    async fn lock_order(&mut self, order_id: OrderId) -> Result<Option<Order>>;

    /// Overwrites an order's status.
    async fn set_order_status(&mut self, order_id: OrderId, status: OrderStatus) -> Result<()>;

    /// Makes every write of this unit durable and visible.
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// A complete backing store for products and orders.
#[async_trait]
pub trait Store: ProductStore + OrderStore {
    /// Opens a new unit of work.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}
