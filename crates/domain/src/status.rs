//! Order status lifecycle management.

use std::str::FromStr;

use common::{OrderId, OrderStatus};
use store::{Order, Store};
use thiserror::Error;

use crate::error::DomainError;

/// Which status changes the manager accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Only single forward steps: `in_process -> sent -> delivered`.
    #[default]
    Strict,

    /// Any status may be assigned from any status (administrative override).
    Override,
}

impl TransitionPolicy {
    /// Returns true if the policy permits moving from `from` to `to`.
    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Strict => from.can_transition_to(to),
            TransitionPolicy::Override => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPolicy::Strict => "strict",
            TransitionPolicy::Override => "override",
        }
    }
}

impl std::fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when text does not name a transition policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transition policy: {0:?} (expected \"strict\" or \"override\")")]
pub struct ParsePolicyError(pub String);

impl FromStr for TransitionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "override" => Ok(TransitionPolicy::Override),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Applies status changes to placed orders.
pub struct OrderStatusManager<S: Store> {
    store: S,
    policy: TransitionPolicy,
}

impl<S: Store> OrderStatusManager<S> {
    /// Creates a manager with the given policy.
    pub fn new(store: S, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the active transition policy.
    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Moves an order to `status`, touching nothing but the status field.
    #[tracing::instrument(skip(self), fields(policy = %self.policy))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let mut uow = self.store.begin().await?;
        let mut order = uow
            .lock_order(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound { order_id })?;

        let previous = order.status;
        if !self.policy.allows(previous, status) {
            return Err(DomainError::invalid(format!(
                "order {order_id} cannot move from {previous} to {status}"
            )));
        }

        uow.set_order_status(order_id, status).await?;
        uow.commit().await?;
        order.status = status;

        metrics::counter!("order_status_updates_total", "status" => status.as_str()).increment(1);
        tracing::info!(%order_id, from = %previous, to = %status, "order status updated");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_policy_follows_transition_table() {
        let policy = TransitionPolicy::Strict;
        assert!(policy.allows(OrderStatus::InProcess, OrderStatus::Sent));
        assert!(policy.allows(OrderStatus::Sent, OrderStatus::Delivered));
        assert!(!policy.allows(OrderStatus::InProcess, OrderStatus::Delivered));
        assert!(!policy.allows(OrderStatus::Delivered, OrderStatus::InProcess));
        assert!(!policy.allows(OrderStatus::Sent, OrderStatus::Sent));
    }

    #[test]
    fn override_policy_accepts_everything() {
        let policy = TransitionPolicy::Override;
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(policy.allows(from, to));
            }
        }
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(
            "Strict".parse::<TransitionPolicy>().unwrap(),
            TransitionPolicy::Strict
        );
        assert_eq!(
            " override ".parse::<TransitionPolicy>().unwrap(),
            TransitionPolicy::Override
        );
        assert!("loose".parse::<TransitionPolicy>().is_err());
        assert_eq!(TransitionPolicy::default(), TransitionPolicy::Strict);
    }
}
