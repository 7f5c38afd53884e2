//! Order lifecycle — shared by bookings and purchases.
//!
//! ```text
//! pending ──► confirmed ──► completed
//!    │
//!    └──────► cancelled
//! ```
//!
//! `confirmed → cancelled` is deliberately absent: once an order is
//! confirmed it can only run to completion. Cancellation exists only while
//! the order is still pending.

use serde::{Deserialize, Serialize};

use crate::Lifecycle;

/// Status of a booking or purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Initial status on creation.
    Pending,
    /// Accepted by an admin.
    Confirmed,
    /// Fulfilled. Terminal.
    Completed,
    /// Withdrawn before confirmation. Terminal.
    Cancelled,
}

impl Lifecycle for OrderStatus {
    fn valid_transitions(self) -> &'static [Self] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Completed],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl OrderStatus {
    /// All statuses, for exhaustive checks and test grids.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Parse a stored status value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{plan_transition, LifecycleError, Planned};
    use proptest::prelude::*;

    /// The complete edge set of the order graph. Any (from, to) pair not
    /// in this list, other than the identity pairs, must be rejected.
    const EDGES: [(OrderStatus, OrderStatus); 3] = [
        (OrderStatus::Pending, OrderStatus::Confirmed),
        (OrderStatus::Pending, OrderStatus::Cancelled),
        (OrderStatus::Confirmed, OrderStatus::Completed),
    ];

    #[test]
    fn graph_matches_edge_list() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = EDGES.contains(&(from, to));
                assert_eq!(
                    from.can_transition(to),
                    expected,
                    "{from} -> {to} edge mismatch"
                );
            }
        }
    }

    #[test]
    fn confirmed_cannot_be_cancelled() {
        let err =
            plan_transition(OrderStatus::Confirmed, OrderStatus::Cancelled).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
    }

    #[test]
    fn no_backward_or_skipping_moves() {
        // Skipping: pending cannot jump straight to completed.
        assert!(plan_transition(OrderStatus::Pending, OrderStatus::Completed).is_err());
        // Backward: confirmed cannot return to pending.
        assert!(plan_transition(OrderStatus::Confirmed, OrderStatus::Pending).is_err());
    }

    #[test]
    fn serde_matches_stored_values() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"cancelled\"").unwrap(),
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn parse_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("refunded"), None);
    }

    fn any_status() -> impl Strategy<Value = OrderStatus> {
        prop::sample::select(OrderStatus::ALL.to_vec())
    }

    proptest! {
        /// Every pair either plans (edge or identity) or errors; a
        /// successful plan is Noop exactly when from == to.
        #[test]
        fn plan_is_total_and_consistent(from in any_status(), to in any_status()) {
            match plan_transition(from, to) {
                Ok(Planned::Noop) => prop_assert_eq!(from, to),
                Ok(Planned::Apply) => prop_assert!(from.can_transition(to)),
                Err(_) => {
                    prop_assert_ne!(from, to);
                    prop_assert!(!from.can_transition(to));
                }
            }
        }

        /// Terminal statuses reject every non-identity target.
        #[test]
        fn terminal_rejects_everything(to in any_status()) {
            for terminal in [OrderStatus::Completed, OrderStatus::Cancelled] {
                if to != terminal {
                    prop_assert!(plan_transition(terminal, to).is_err());
                }
            }
        }
    }
}
