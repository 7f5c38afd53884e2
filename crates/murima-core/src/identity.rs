//! # Identifier Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the platform.
//! Each identifier is a distinct type — you cannot pass a [`PropertyId`]
//! where a [`BookingId`] is expected.
//!
//! ## Validation
//!
//! String-based contact fields ([`Email`], [`Phone`]) validate format at
//! construction time. UUID-based identifiers are always valid by
//! construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Implement a UUID-backed identifier newtype with the standard surface:
/// `new()`, `from_uuid()`, `as_uuid()`, `Default`, `Display`, `FromStr`.
macro_rules! uuid_id {
    ($(#[$doc:meta])* $ty:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// A registered identity. Doubles as the profile row key.
    UserId
);
uuid_id!(
    /// A rental, stay, or office-space property listing.
    PropertyId
);
uuid_id!(
    /// A household-goods marketplace item.
    ItemId
);
uuid_id!(
    /// A moving-services directory entry.
    ServiceId
);
uuid_id!(
    /// A booking request against a property.
    BookingId
);
uuid_id!(
    /// A purchase request against a marketplace item.
    PurchaseId
);
uuid_id!(
    /// A moving quote request against a service.
    QuoteId
);

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so invalid values are rejected
/// at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// An email address, captured at submission time on transaction records.
///
/// Validation is intentionally shallow — one `@` with non-empty local part
/// and a domain containing a dot. Deliverability is the mail provider's
/// problem, not this layer's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Email(String);

impl_validating_deserialize!(Email);

impl Email {
    /// Create an email address, validating shape.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEmail`] if the string does not
    /// look like `local@domain.tld`.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let trimmed = s.trim();

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(ValidationError::InvalidEmail(s));
        };
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(ValidationError::InvalidEmail(s));
        }
        if trimmed.len() > 254 || domain.ends_with('.') || domain.starts_with('.') {
            return Err(ValidationError::InvalidEmail(s));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Access the normalized (lowercase, trimmed) address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A phone number in loose international form.
///
/// Accepts an optional leading `+`, then 7-15 digits. Spaces and dashes are
/// stripped before validation and storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Phone(String);

impl_validating_deserialize!(Phone);

impl Phone {
    /// Create a phone number, validating shape.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPhone`] if, after stripping spaces
    /// and dashes, the value is not an optional `+` followed by 7-15 digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let cleaned: String = raw.chars().filter(|c| *c != ' ' && *c != '-').collect();

        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
        if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidPhone(raw));
        }

        Ok(Self(cleaned))
    }

    /// Access the canonical form (no spaces or dashes).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
