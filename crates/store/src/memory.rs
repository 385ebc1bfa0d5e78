use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    ListQuery, NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, ProductId, Result,
    StoreError,
    store::{OrderStore, ProductStore, Store, UnitOfWork},
};

#[derive(Debug, Default)]
struct MemoryState {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    next_product_id: i64,
    next_order_id: i64,
}

impl MemoryState {
    fn is_referenced(&self, product_id: ProductId) -> bool {
        self.orders
            .values()
            .flat_map(|order| order.items.iter())
            .any(|item| item.product_id == product_id)
    }
}

/// In-memory store implementation for tests and local runs.
///
/// All access goes through one async mutex. A unit of work holds the mutex
/// for its whole lifetime and stages its writes, so units run one at a time
/// and an abandoned unit leaves no trace.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored products.
    pub async fn product_count(&self) -> usize {
        self.state.lock().await.products.len()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let mut state = self.state.lock().await;
        state.next_product_id += 1;
        let product = product.into_product(ProductId::new(state.next_product_id));
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        let state = self.state.lock().await;
        Ok(state.products.get(&product_id).cloned())
    }

    async fn list_products(&self, query: ListQuery) -> Result<Vec<Product>> {
        let state = self.state.lock().await;
        Ok(query.apply(state.products.values().cloned()))
    }

    async fn update_product(
        &self,
        product_id: ProductId,
        product: NewProduct,
    ) -> Result<Option<Product>> {
        let mut state = self.state.lock().await;
        let Some(existing) = state.products.get_mut(&product_id) else {
            return Ok(None);
        };
        *existing = product.into_product(product_id);
        Ok(Some(existing.clone()))
    }

    async fn delete_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        let mut state = self.state.lock().await;
        if !state.products.contains_key(&product_id) {
            return Ok(None);
        }
        if state.is_referenced(product_id) {
            return Err(StoreError::ProductReferenced(product_id));
        }
        Ok(state.products.remove(&product_id))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let state = self.state.lock().await;
        Ok(state.orders.get(&order_id).cloned())
    }

    async fn list_orders(&self, query: ListQuery) -> Result<Vec<Order>> {
        let state = self.state.lock().await;
        Ok(query.apply(state.orders.values().cloned()))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let state = self.state.clone().lock_owned().await;
        let next_order_id = state.next_order_id;
        Ok(Box::new(InMemoryUnitOfWork {
            state,
            quantities: HashMap::new(),
            orders: Vec::new(),
            statuses: HashMap::new(),
            next_order_id,
        }))
    }
}

/// Unit of work over [`InMemoryStore`]: writes are staged here and applied
/// to the shared state on commit.
pub struct InMemoryUnitOfWork {
    state: OwnedMutexGuard<MemoryState>,
    quantities: HashMap<ProductId, i64>,
    orders: Vec<Order>,
    statuses: HashMap<OrderId, OrderStatus>,
    next_order_id: i64,
}

impl InMemoryUnitOfWork {
    fn available(&self, product_id: ProductId) -> Option<i64> {
        self.quantities.get(&product_id).copied().or_else(|| {
            self.state
                .products
                .get(&product_id)
                .map(|product| product.quantity)
        })
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn lock_products(&mut self, product_ids: &[ProductId]) -> Result<Vec<Product>> {
        let mut locked = BTreeMap::new();
        for id in product_ids {
            if let Some(product) = self.state.products.get(id) {
                let mut product = product.clone();
                product.quantity = self.available(*id).unwrap_or(product.quantity);
                locked.insert(*id, product);
            }
        }
        Ok(locked.into_values().collect())
    }

    async fn decrement_quantity(
        &mut self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<Option<i64>> {
        let Some(current) = self.available(product_id) else {
            return Ok(None);
        };
        if amount > current {
            return Ok(None);
        }
        let remaining = current - amount;
        self.quantities.insert(product_id, remaining);
        Ok(Some(remaining))
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        self.next_order_id += 1;
        let order = order.into_order(OrderId::new(self.next_order_id));
        self.orders.push(order.clone());
        Ok(order)
    }

    async fn lock_order(&mut self, order_id: OrderId) -> Result<Option<Order>> {
        let order = self
            .orders
            .iter()
            .find(|order| order.id == order_id)
            .or_else(|| self.state.orders.get(&order_id))
            .cloned()
            .map(|mut order| {
                if let Some(status) = self.statuses.get(&order_id) {
                    order.status = *status;
                }
                order
            });
        Ok(order)
    }

    async fn set_order_status(&mut self, order_id: OrderId, status: OrderStatus) -> Result<()> {
        if let Some(order) = self.orders.iter_mut().find(|order| order.id == order_id) {
            order.status = status;
        } else if self.state.orders.contains_key(&order_id) {
            self.statuses.insert(order_id, status);
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryUnitOfWork {
            mut state,
            quantities,
            orders,
            statuses,
            next_order_id,
        } = *self;

        for (product_id, quantity) in quantities {
            if let Some(product) = state.products.get_mut(&product_id) {
                product.quantity = quantity;
            }
        }
        for (order_id, status) in statuses {
            if let Some(order) = state.orders.get_mut(&order_id) {
                order.status = status;
            }
        }
        for order in orders {
            state.orders.insert(order.id, order);
        }
        state.next_order_id = next_order_id;

        tracing::trace!("in-memory unit of work committed");
        Ok(())
    }
}
