//! Order placement: validate, reserve stock and create the order as one
//! unit of work.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use common::ProductId;
use store::{NewOrder, Order, OrderItem, Store};

use crate::error::DomainError;

/// One requested (product, quantity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl OrderLine {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Places orders against the store.
///
/// A placement either commits the order together with every stock
/// decrement it made, or leaves the store untouched. Lines are checked in
/// request order, so the first failing line determines the error.
pub struct OrderPlacementEngine<S: Store> {
    store: S,
}

impl<S: Store> OrderPlacementEngine<S> {
    /// Creates a new engine over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reserves stock for every line and creates an `in_process` order.
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn place_order(&self, lines: Vec<OrderLine>) -> Result<Order, DomainError> {
        let started = Instant::now();
        let result = self.reserve_and_create(lines).await;
        metrics::histogram!("order_placement_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(order) => {
                metrics::counter!("orders_placed_total").increment(1);
                tracing::info!(order_id = %order.id, items = order.items.len(), "order placed");
            }
            Err(err) => {
                metrics::counter!("order_placement_rejected_total", "reason" => err.kind())
                    .increment(1);
                tracing::warn!(error = %err, "order placement rejected");
            }
        }

        result
    }

    async fn reserve_and_create(&self, lines: Vec<OrderLine>) -> Result<Order, DomainError> {
        validate_lines(&lines)?;

        // Lock in ascending id order so concurrent placements cannot deadlock.
        let mut product_ids: Vec<ProductId> = lines.iter().map(|line| line.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();

        // Any early return below drops `uow`, which discards its writes.
        let mut uow = self.store.begin().await?;
        let mut available: HashMap<ProductId, i64> = uow
            .lock_products(&product_ids)
            .await?
            .into_iter()
            .map(|product| (product.id, product.quantity))
            .collect();

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let remaining =
                available
                    .get_mut(&line.product_id)
                    .ok_or(DomainError::ProductNotFound {
                        product_id: line.product_id,
                    })?;

            let insufficient = DomainError::InsufficientStock {
                product_id: line.product_id,
                available: *remaining,
                requested: line.quantity,
            };
            if line.quantity > *remaining {
                return Err(insufficient);
            }

            *remaining = uow
                .decrement_quantity(line.product_id, line.quantity)
                .await?
                .ok_or(insufficient)?;
            items.push(OrderItem::new(line.product_id, line.quantity));
        }

        let order = uow.insert_order(NewOrder::new(Utc::now(), items)).await?;
        uow.commit().await?;
        Ok(order)
    }
}

fn validate_lines(lines: &[OrderLine]) -> Result<(), DomainError> {
    if lines.is_empty() {
        return Err(DomainError::invalid("order must contain at least one item"));
    }

    if let Some((index, line)) = lines
        .iter()
        .enumerate()
        .find(|(_, line)| line.quantity <= 0)
    {
        return Err(DomainError::invalid(format!(
            "item {index} (product {}): quantity must be positive, got {}",
            line.product_id, line.quantity
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use store::{InMemoryStore, NewProduct, ProductStore};

    use super::*;

    async fn setup(quantity: i64) -> (OrderPlacementEngine<InMemoryStore>, InMemoryStore, ProductId) {
        let store = InMemoryStore::new();
        let product = store
            .create_product(NewProduct::new("Product 1", Decimal::new(100, 0), quantity))
            .await
            .unwrap();
        (OrderPlacementEngine::new(store.clone()), store, product.id)
    }

    #[test]
    fn empty_request_is_invalid() {
        let err = validate_lines(&[]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { .. }));
    }

    #[test]
    fn non_positive_quantity_is_invalid() {
        let lines = [
            OrderLine::new(ProductId::new(1), 2),
            OrderLine::new(ProductId::new(2), 0),
        ];
        let err = validate_lines(&lines).unwrap_err();
        match err {
            DomainError::InvalidInput { reason } => assert!(reason.contains("item 1")),
            other => panic!("unexpected error: {other}"),
        }

        let negative = [OrderLine::new(ProductId::new(1), -4)];
        assert!(validate_lines(&negative).is_err());
    }

    #[tokio::test]
    async fn places_order_and_decrements_stock() {
        let (engine, store, product_id) = setup(50).await;

        let order = engine
            .place_order(vec![OrderLine::new(product_id, 20)])
            .await
            .unwrap();

        assert_eq!(order.items, vec![OrderItem::new(product_id, 20)]);
        assert_eq!(order.status, common::OrderStatus::InProcess);
        let product = store.get_product(product_id).await.unwrap().unwrap();
        assert_eq!(product.quantity, 30);
    }

    #[tokio::test]
    async fn insufficient_stock_reports_available_and_requested() {
        let (engine, store, product_id) = setup(10).await;

        let err = engine
            .place_order(vec![OrderLine::new(product_id, 300)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::InsufficientStock { product_id: p, available: 10, requested: 300 }
                if p == product_id
        ));
        let product = store.get_product(product_id).await.unwrap().unwrap();
        assert_eq!(product.quantity, 10);
    }

    #[tokio::test]
    async fn repeated_product_lines_reserve_cumulatively() {
        let (engine, store, product_id) = setup(10).await;

        let err = engine
            .place_order(vec![
                OrderLine::new(product_id, 6),
                OrderLine::new(product_id, 6),
            ])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientStock {
                available: 4,
                requested: 6,
                ..
            }
        ));
        assert_eq!(
            store.get_product(product_id).await.unwrap().unwrap().quantity,
            10
        );

        let order = engine
            .place_order(vec![
                OrderLine::new(product_id, 6),
                OrderLine::new(product_id, 4),
            ])
            .await
            .unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(
            store.get_product(product_id).await.unwrap().unwrap().quantity,
            0
        );
    }

    #[tokio::test]
    async fn invalid_request_never_touches_store() {
        let (engine, store, product_id) = setup(10).await;

        let result = engine
            .place_order(vec![
                OrderLine::new(product_id, 5),
                OrderLine::new(product_id, -1),
            ])
            .await;

        assert!(matches!(result, Err(DomainError::InvalidInput { .. })));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(
            store.get_product(product_id).await.unwrap().unwrap().quantity,
            10
        );
    }
}
