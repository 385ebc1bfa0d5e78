//! Records held by the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderStatus, ProductId};

/// A product with its available stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    /// Units available for reservation. Never negative.
    pub quantity: i64,
}

/// Field values for creating or fully replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
}

impl NewProduct {
    /// Creates product fields without a description.
    pub fn new(name: impl Into<String>, price: Decimal, quantity: i64) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            quantity,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            quantity: self.quantity,
        }
    }
}

/// One reserved line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl OrderItem {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A placed order and its line items, in placement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Total units reserved for `product_id` across all lines.
    pub fn quantity_of(&self, product_id: ProductId) -> i64 {
        self.items
            .iter()
            .filter(|item| item.product_id == product_id)
            .map(|item| item.quantity)
            .sum()
    }
}

/// An order ready to be inserted. The store assigns the id and the
/// initial status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl NewOrder {
    pub fn new(created_at: DateTime<Utc>, items: Vec<OrderItem>) -> Self {
        Self { created_at, items }
    }

    pub(crate) fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            created_at: self.created_at,
            status: OrderStatus::default(),
            items: self.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_of_sums_repeated_lines() {
        let p1 = ProductId::new(1);
        let p2 = ProductId::new(2);
        let order = NewOrder::new(
            Utc::now(),
            vec![
                OrderItem::new(p1, 3),
                OrderItem::new(p2, 1),
                OrderItem::new(p1, 4),
            ],
        )
        .into_order(OrderId::new(1));

        assert_eq!(order.quantity_of(p1), 7);
        assert_eq!(order.quantity_of(p2), 1);
        assert_eq!(order.quantity_of(ProductId::new(3)), 0);
    }

    #[test]
    fn new_order_starts_in_process() {
        let order = NewOrder::new(Utc::now(), vec![]).into_order(OrderId::new(5));
        assert_eq!(order.status, OrderStatus::InProcess);
        assert_eq!(order.id, OrderId::new(5));
    }
}
