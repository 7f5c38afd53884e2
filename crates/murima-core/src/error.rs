//! Structured validation errors.
//!
//! One variant per malformed-field class. Form submissions surface the first
//! failing field only, so these errors are returned eagerly rather than
//! collected into an aggregate.

use thiserror::Error;

/// Validation failure for a submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty or whitespace-only.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// A field exceeded its maximum length.
    #[error("{field} must not exceed {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Email address does not match the expected shape.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// Phone number does not match the expected shape.
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// A price or amount was negative or otherwise out of range.
    #[error("{field} must be a non-negative amount, got {value}")]
    InvalidAmount { field: &'static str, value: i64 },

    /// A listing was submitted without any images.
    #[error("at least one image is required")]
    NoImages,

    /// Check-out date is not strictly after check-in.
    #[error("check-out date must be after check-in date")]
    CheckOutBeforeCheckIn,

    /// Check-in date is earlier than today (UTC calendar date).
    #[error("check-in date must not be in the past")]
    CheckInInPast,

    /// An unknown enum value was supplied (listing type, item condition, ...).
    #[error("invalid {field}: '{value}'")]
    UnknownVariant { field: &'static str, value: String },
}
