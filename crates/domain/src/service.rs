//! Order service providing a single entry point for order operations.

use common::{OrderId, OrderStatus};
use store::{ListQuery, Order, Store};

use crate::error::DomainError;
use crate::placement::{OrderLine, OrderPlacementEngine};
use crate::status::{OrderStatusManager, TransitionPolicy};

/// Service for managing orders.
///
/// Bundles the placement engine, the status manager and the read paths over
/// one store.
pub struct OrderService<S: Store> {
    store: S,
    placement: OrderPlacementEngine<S>,
    status: OrderStatusManager<S>,
}

impl<S: Store + Clone> OrderService<S> {
    /// Creates a new order service with the strict transition policy.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, TransitionPolicy::default())
    }

    /// Creates a new order service with the given transition policy.
    pub fn with_policy(store: S, policy: TransitionPolicy) -> Self {
        Self {
            placement: OrderPlacementEngine::new(store.clone()),
            status: OrderStatusManager::new(store.clone(), policy),
            store,
        }
    }
}

impl<S: Store> OrderService<S> {
    /// Returns the active transition policy.
    pub fn policy(&self) -> TransitionPolicy {
        self.status.policy()
    }

    /// Places a new order. See [`OrderPlacementEngine::place_order`].
    pub async fn place_order(&self, lines: Vec<OrderLine>) -> Result<Order, DomainError> {
        self.placement.place_order(lines).await
    }

    /// Changes an order's status. See [`OrderStatusManager::update_status`].
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        self.status.update_status(order_id, status).await
    }

    /// Loads an order with its items.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound { order_id })
    }

    /// Lists orders in id order.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, query: ListQuery) -> Result<Vec<Order>, DomainError> {
        Ok(self.store.list_orders(query).await?)
    }
}
