//! PostgreSQL persistence.
//!
//! Write-through layout: handlers commit to the in-memory store first and
//! then mirror the change here; a database failure after the in-memory
//! commit surfaces as a 500. On startup `load_all` in each module rehydrates
//! the stores. Lifecycle constraints are enforced at the application layer,
//! not in SQL.

pub mod bookings;
pub mod marketplace;
pub mod movers;
pub mod profiles;
pub mod properties;
pub mod purchases;
pub mod quotes;

/// Wrap a serde failure in the transport error type used throughout.
pub(crate) fn encode_err(what: &str, e: serde_json::Error) -> sqlx::Error {
    sqlx::Error::Protocol(format!("failed to serialize {what}: {e}"))
}

/// A stored value that should have been valid at write time but no longer
/// parses. Loading fails loudly rather than guessing.
pub(crate) fn decode_err(what: &str, detail: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::Protocol(format!("failed to decode {what}: {detail}"))
}
