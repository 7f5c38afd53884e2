//! # murima-core — Foundational Types for the Murima Platform
//!
//! Domain primitives shared by every other crate in the workspace:
//!
//! - **Identifiers** ([`identity`]): distinct UUID newtypes per entity kind
//!   and validated string newtypes for contact fields. You cannot pass a
//!   [`PropertyId`] where a [`BookingId`] is expected.
//! - **Roles** ([`role`]): the three-valued role attribute attached to every
//!   profile (`user`, `moderator`, `admin`) — the only server-enforced enum
//!   in the storage schema.
//! - **Profiles** ([`profile`]): the identity profile row keyed by the
//!   identity id. Role is always read from here, never from a session token.
//! - **Errors** ([`error`]): the validation error hierarchy. Validation
//!   reports the first failing field, matching the one-message-at-a-time
//!   behavior of the submission forms.

pub mod error;
pub mod identity;
pub mod profile;
pub mod role;

pub use error::ValidationError;
pub use identity::{
    BookingId, Email, ItemId, Phone, PropertyId, PurchaseId, QuoteId, ServiceId, UserId,
};
pub use profile::Profile;
pub use role::Role;
