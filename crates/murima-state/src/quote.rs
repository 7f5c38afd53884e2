//! Moving-quote lifecycle.
//!
//! ```text
//! pending ──► confirmed ──► quoted
//!    │
//!    └──────► cancelled
//! ```
//!
//! Quotes carry one extra state over orders: `quoted`, reached only when an
//! admin attaches a price. The amount is supplied at the moment of the
//! transition and never at any other time.

use serde::{Deserialize, Serialize};

use crate::{Lifecycle, LifecycleError};

/// Status of a moving-quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    /// Initial status on creation.
    Pending,
    /// Accepted for pricing by an admin.
    Confirmed,
    /// Priced — `quote_amount` is now set. Terminal.
    Quoted,
    /// Withdrawn before confirmation. Terminal.
    Cancelled,
}

impl Lifecycle for QuoteStatus {
    fn valid_transitions(self) -> &'static [Self] {
        match self {
            QuoteStatus::Pending => &[QuoteStatus::Confirmed, QuoteStatus::Cancelled],
            QuoteStatus::Confirmed => &[QuoteStatus::Quoted],
            QuoteStatus::Quoted | QuoteStatus::Cancelled => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Confirmed => "confirmed",
            QuoteStatus::Quoted => "quoted",
            QuoteStatus::Cancelled => "cancelled",
        }
    }
}

impl QuoteStatus {
    /// All statuses, for exhaustive checks and test grids.
    pub const ALL: [QuoteStatus; 4] = [
        QuoteStatus::Pending,
        QuoteStatus::Confirmed,
        QuoteStatus::Quoted,
        QuoteStatus::Cancelled,
    ];

    /// Whether a transition *into* this status must carry an amount.
    pub fn requires_amount(self) -> bool {
        matches!(self, QuoteStatus::Quoted)
    }

    /// Parse a stored status value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(QuoteStatus::Pending),
            "confirmed" => Some(QuoteStatus::Confirmed),
            "quoted" => Some(QuoteStatus::Quoted),
            "cancelled" => Some(QuoteStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validate the amount accompanying a transition request.
///
/// Only the `quoted` target takes an amount; it must be present and
/// non-negative. Amounts supplied on other targets are ignored by the
/// controller, matching the storage schema where `quote_amount` is written
/// exclusively by the quoting step.
pub fn validate_quote_amount(
    target: QuoteStatus,
    amount: Option<i64>,
) -> Result<Option<i64>, LifecycleError> {
    if !target.requires_amount() {
        return Ok(None);
    }
    match amount {
        None => Err(LifecycleError::MissingAmount),
        Some(a) if a < 0 => Err(LifecycleError::InvalidAmount(a)),
        Some(a) => Ok(Some(a)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{plan_transition, Planned};

    const EDGES: [(QuoteStatus, QuoteStatus); 3] = [
        (QuoteStatus::Pending, QuoteStatus::Confirmed),
        (QuoteStatus::Pending, QuoteStatus::Cancelled),
        (QuoteStatus::Confirmed, QuoteStatus::Quoted),
    ];

    #[test]
    fn graph_matches_edge_list() {
        for from in QuoteStatus::ALL {
            for to in QuoteStatus::ALL {
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
    fn quoted_is_terminal() {
        assert!(QuoteStatus::Quoted.is_terminal());
        // Attempting to reopen a quoted record is rejected.
        assert!(plan_transition(QuoteStatus::Quoted, QuoteStatus::Pending).is_err());
    }

    #[test]
    fn pending_cannot_skip_to_quoted() {
        assert!(plan_transition(QuoteStatus::Pending, QuoteStatus::Quoted).is_err());
    }

    #[test]
    fn quoted_requires_amount() {
        assert_eq!(
            validate_quote_amount(QuoteStatus::Quoted, None),
            Err(LifecycleError::MissingAmount)
        );
        assert_eq!(
            validate_quote_amount(QuoteStatus::Quoted, Some(-1)),
            Err(LifecycleError::InvalidAmount(-1))
        );
        assert_eq!(
            validate_quote_amount(QuoteStatus::Quoted, Some(50_000)),
            Ok(Some(50_000))
        );
        // Zero is a legal quote.
        assert_eq!(validate_quote_amount(QuoteStatus::Quoted, Some(0)), Ok(Some(0)));
    }

    #[test]
    fn amount_ignored_on_other_targets() {
        assert_eq!(
            validate_quote_amount(QuoteStatus::Confirmed, Some(99)),
            Ok(None)
        );
        assert_eq!(validate_quote_amount(QuoteStatus::Cancelled, None), Ok(None));
    }

    #[test]
    fn idempotent_quoted_is_noop() {
        assert_eq!(
            plan_transition(QuoteStatus::Quoted, QuoteStatus::Quoted).unwrap(),
            Planned::Noop
        );
    }

    #[test]
    fn serde_matches_stored_values() {
        assert_eq!(
            serde_json::to_string(&QuoteStatus::Quoted).unwrap(),
            "\"quoted\""
        );
        assert_eq!(
            serde_json::from_str::<QuoteStatus>("\"pending\"").unwrap(),
            QuoteStatus::Pending
        );
    }

    #[test]
    fn parse_roundtrip() {
        for status in QuoteStatus::ALL {
            assert_eq!(QuoteStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(QuoteStatus::parse("priced"), None);
    }
}
