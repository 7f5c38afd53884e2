//! Identity profiles.
//!
//! Created alongside registration, keyed by the identity id. The `role`
//! column here is the single source of truth for authorization — sessions
//! carry only the identity id and email, and role is looked up per request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Email, Phone, UserId};
use crate::role::Role;

/// A profile row in the `profiles` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Identity id — same value as the auth identity, not a separate key.
    pub id: UserId,
    /// Optional handle shown on listings.
    pub username: Option<String>,
    /// Display name.
    pub full_name: String,
    /// Contact email (mirrors the auth identity's email at registration).
    pub email: Email,
    /// Optional contact phone.
    pub phone: Option<Phone>,
    /// Avatar public URL, if one was uploaded.
    pub avatar_url: Option<String>,
    /// Free-text bio.
    pub bio: Option<String>,
    /// Exactly one role at a time. Changed only by an admin.
    pub role: Role,
    /// Verification badge, toggled by admins.
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    /// Role changes are audited only through this timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Build the profile created at registration time: `user` role,
    /// unverified, timestamps set to now.
    pub fn for_registration(id: UserId, full_name: String, email: Email) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: None,
            full_name,
            email,
            phone: None,
            avatar_url: None,
            bio: None,
            role: Role::default_for_registration(),
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}
