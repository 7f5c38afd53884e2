//! # murima-state — Transaction Lifecycle State Machines
//!
//! Every transaction variant on the platform carries a status, and the legal
//! moves between statuses are encoded here as explicit transition graphs
//! rather than scattered per-status conditionals. The UI and the admin
//! console both derive "which actions exist" by asking
//! [`Lifecycle::valid_transitions`], so the rendered buttons can never
//! diverge from what the backend accepts.
//!
//! ## State Machines
//!
//! - **Order** ([`order`]): bookings and purchases.
//!   `pending → confirmed → completed`, with `pending → cancelled`. A
//!   confirmed order cannot be cancelled — only the pending-adjacent cancel
//!   exists, which is the business contract, not an omission.
//!
//! - **Quote** ([`quote`]): moving quotes. `pending → confirmed → quoted`,
//!   with `pending → cancelled`. The `quoted` transition is the only one
//!   that carries data: a non-negative amount must accompany it.
//!
//! ## Idempotence
//!
//! Requesting a transition to the current status is a no-op success, never
//! an error — two rapid clicks on the same admin button must not fail the
//! second request. [`plan_transition`] distinguishes the no-op from an
//! applied transition so callers skip persistence and audit logging for
//! retries.

pub mod order;
pub mod quote;

use chrono::{DateTime, Utc};
use murima_core::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use order::OrderStatus;
pub use quote::QuoteStatus;

/// A status enum with an explicit transition graph.
pub trait Lifecycle: Copy + Eq + std::fmt::Debug + 'static {
    /// The statuses directly reachable from `self`. Terminal statuses
    /// return an empty slice.
    fn valid_transitions(self) -> &'static [Self];

    /// Stable lowercase name, matching the stored column values.
    fn as_str(self) -> &'static str;

    /// Whether no further transitions exist from this status.
    fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Whether `target` is directly reachable from `self`.
    fn can_transition(self, target: Self) -> bool {
        self.valid_transitions().contains(&target)
    }
}

/// Outcome of planning a transition: either the move is applied, or the
/// record is already in the target status and nothing should change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planned {
    /// The transition is legal; persist the new status and log it.
    Apply,
    /// Already in the target status — succeed without mutating anything.
    Noop,
}

/// Validate a requested transition against the graph.
///
/// Same-status requests plan as [`Planned::Noop`] (retry safety); anything
/// not on a graph edge is [`LifecycleError::InvalidTransition`] with the
/// legal targets named in the message.
pub fn plan_transition<S: Lifecycle>(current: S, target: S) -> Result<Planned, LifecycleError> {
    if current == target {
        return Ok(Planned::Noop);
    }
    if current.can_transition(target) {
        return Ok(Planned::Apply);
    }
    Err(LifecycleError::InvalidTransition {
        from: current.as_str(),
        to: target.as_str(),
        valid: current
            .valid_transitions()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Failure modes of the lifecycle controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The target is not directly reachable from the current status.
    #[error("cannot transition from {from} to {to}; valid targets: [{valid}]")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
        valid: String,
    },

    /// A `quoted` transition was requested without an amount.
    #[error("transition to quoted requires a quote amount")]
    MissingAmount,

    /// The supplied amount was negative.
    #[error("quote amount must be non-negative, got {0}")]
    InvalidAmount(i64),
}

/// One entry in a transaction's transition log — the durable record of who
/// moved the status, from what, to what, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: String,
    pub to: String,
    /// The admin identity that triggered the transition.
    pub actor: UserId,
    pub at: DateTime<Utc>,
}

impl TransitionRecord {
    /// Record a transition happening now.
    pub fn now<S: Lifecycle>(from: S, to: S, actor: UserId) -> Self {
        Self {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
            actor,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_status_plans_noop() {
        assert_eq!(
            plan_transition(OrderStatus::Pending, OrderStatus::Pending).unwrap(),
            Planned::Noop
        );
        assert_eq!(
            plan_transition(QuoteStatus::Quoted, QuoteStatus::Quoted).unwrap(),
            Planned::Noop
        );
    }

    #[test]
    fn legal_edge_plans_apply() {
        assert_eq!(
            plan_transition(OrderStatus::Pending, OrderStatus::Confirmed).unwrap(),
            Planned::Apply
        );
    }

    #[test]
    fn illegal_edge_names_valid_targets() {
        let err = plan_transition(OrderStatus::Completed, OrderStatus::Pending).unwrap_err();
        match err {
            LifecycleError::InvalidTransition { from, to, valid } => {
                assert_eq!(from, "completed");
                assert_eq!(to, "pending");
                assert!(valid.is_empty(), "terminal state has no valid targets");
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn transition_record_captures_names() {
        let actor = UserId::new();
        let record = TransitionRecord::now(OrderStatus::Pending, OrderStatus::Confirmed, actor);
        assert_eq!(record.from, "pending");
        assert_eq!(record.to, "confirmed");
        assert_eq!(record.actor, actor);
    }
}
