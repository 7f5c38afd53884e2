//! The role attribute attached to every identity profile.
//!
//! Exactly one role at a time. `admin` and `moderator` are granted only by
//! an existing admin through the user-management surface; fresh
//! registrations always start as `user`.

use serde::{Deserialize, Serialize};

/// The three-valued role enum — the only server-enforced enum surfaced by
/// the storage schema (`app_role`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member: may browse, create listings, and submit transactions.
    User,
    /// Moderation staff: read access to the moderation dashboards. Never
    /// permitted to transition transactions or manage users.
    Moderator,
    /// Platform administrator: full access including lifecycle transitions,
    /// listing deletion, and role management.
    Admin,
}

impl Role {
    /// The role assigned to fresh registrations.
    pub const fn default_for_registration() -> Self {
        Role::User
    }

    /// Whether this role is exactly `admin`.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role may access admin-or-moderator surfaces.
    pub fn can_moderate(self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }

    /// Stable lowercase name, matching the stored enum values.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Parse a stored role value. Unknown strings yield `None` rather than
    /// defaulting, so a corrupted row cannot silently gain privileges.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "moderator" => Some(Role::Moderator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
