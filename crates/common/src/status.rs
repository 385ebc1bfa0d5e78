//! Order lifecycle status.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of an order in its lifecycle.
///
/// Forward transitions:
/// ```text
/// InProcess ──► Sent ──► Delivered
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been placed and stock reserved.
    #[default]
    InProcess,

    /// Order has left the warehouse.
    Sent,

    /// Order reached the customer (terminal state).
    Delivered,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::InProcess,
        OrderStatus::Sent,
        OrderStatus::Delivered,
    ];

    /// Returns the single status that may follow this one, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::InProcess => Some(OrderStatus::Sent),
            OrderStatus::Sent => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// Returns true if moving to `target` is a forward, single-step transition.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.next() == Some(target)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Returns the wire/database name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::InProcess => "in_process",
            OrderStatus::Sent => "sent",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when text does not name a known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}
