//! # Access Gate
//!
//! Pure authorization policy over the per-request [`AuthState`]. Routes
//! declare a [`Requirement`]; [`authorize`] produces one of four decisions:
//!
//! - `Allow` — proceed.
//! - `Redirect` — anonymous caller on a protected route; send them to the
//!   sign-in page, preserving where they were headed.
//! - `Deny` — signed-in caller whose role does not satisfy the requirement;
//!   the decision names the requirement and links the admin portal. No
//!   automatic redirect.
//! - `Loading` — the caller's role is not yet known. Never grants access;
//!   maps to 503 so clients retry rather than cache a denial.
//!
//! A moderator on an admin-only requirement is always `Deny`: moderator
//! read access is a property of the views gated admin-or-moderator, not a
//! downgrade applied here.

use murima_core::Role;

use crate::auth::AuthState;
use crate::error::AppError;

/// What a route demands of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any signed-in caller.
    Authenticated,
    /// Admin role only.
    AdminOnly,
    /// Admin or moderator role.
    AdminOrModerator,
}

impl Requirement {
    pub fn describe(self) -> &'static str {
        match self {
            Requirement::Authenticated => "a signed-in account",
            Requirement::AdminOnly => "the admin role",
            Requirement::AdminOrModerator => "the admin or moderator role",
        }
    }

    fn satisfied_by(self, role: Role) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::AdminOnly => role.is_admin(),
            Requirement::AdminOrModerator => role.can_moderate(),
        }
    }
}

/// The gate's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Send the caller to sign in, then back to where they were going.
    Redirect { to: &'static str, from: String },
    /// Refuse, naming the unmet requirement.
    Deny { requirement: Requirement },
    /// Role resolution in flight; try again.
    Loading,
}

/// Decide access for `auth` against `requirement`. `location` is the
/// request path, preserved through the sign-in redirect.
pub fn authorize(auth: &AuthState, requirement: Requirement, location: &str) -> Access {
    match auth {
        AuthState::Anonymous => Access::Redirect {
            to: "/auth",
            from: location.to_string(),
        },
        AuthState::Resolving { .. } => Access::Loading,
        AuthState::Authenticated(caller) => {
            if requirement.satisfied_by(caller.role) {
                Access::Allow
            } else {
                Access::Deny { requirement }
            }
        }
    }
}

impl Access {
    /// Collapse the decision into the handler result: anything other than
    /// `Allow` becomes the corresponding HTTP error.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Access::Allow => Ok(()),
            Access::Redirect { to, from } => Err(AppError::Unauthenticated(format!(
                "sign in at {to} to continue to {from}"
            ))),
            Access::Deny { requirement } => Err(AppError::Forbidden(format!(
                "this area requires {}",
                requirement.describe()
            ))),
            Access::Loading => Err(AppError::ServiceUnavailable(
                "caller role is still being resolved".to_string(),
            )),
        }
    }
}

/// Authorize or fail in one step.
pub fn require(auth: &AuthState, requirement: Requirement, location: &str) -> Result<(), AppError> {
    authorize(auth, requirement, location).into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CallerIdentity;
    use murima_core::{Email, UserId};

    fn signed_in(role: Role) -> AuthState {
        AuthState::Authenticated(CallerIdentity {
            user_id: UserId::new(),
            email: Email::new("gate@example.com").unwrap(),
            role,
        })
    }

    #[test]
    fn anonymous_is_redirected_with_location() {
        let access = authorize(&AuthState::Anonymous, Requirement::Authenticated, "/admin");
        assert_eq!(
            access,
            Access::Redirect {
                to: "/auth",
                from: "/admin".to_string()
            }
        );
    }

    #[test]
    fn user_on_admin_only_is_denied_not_redirected() {
        let access = authorize(&signed_in(Role::User), Requirement::AdminOnly, "/admin");
        assert_eq!(
            access,
            Access::Deny {
                requirement: Requirement::AdminOnly
            }
        );
    }

    #[test]
    fn moderator_on_admin_only_is_denied() {
        let access = authorize(&signed_in(Role::Moderator), Requirement::AdminOnly, "/admin");
        assert!(matches!(access, Access::Deny { .. }));
    }

    #[test]
    fn moderator_passes_admin_or_moderator() {
        let access = authorize(
            &signed_in(Role::Moderator),
            Requirement::AdminOrModerator,
            "/admin/dashboard",
        );
        assert_eq!(access, Access::Allow);
    }

    #[test]
    fn admin_passes_everything() {
        for requirement in [
            Requirement::Authenticated,
            Requirement::AdminOnly,
            Requirement::AdminOrModerator,
        ] {
            assert_eq!(
                authorize(&signed_in(Role::Admin), requirement, "/x"),
                Access::Allow
            );
        }
    }

    #[test]
    fn loading_never_allows() {
        for requirement in [
            Requirement::Authenticated,
            Requirement::AdminOnly,
            Requirement::AdminOrModerator,
        ] {
            let auth = AuthState::Resolving {
                user_id: UserId::new(),
            };
            assert_eq!(authorize(&auth, requirement, "/x"), Access::Loading);
        }
    }

    #[test]
    fn decisions_map_to_http_errors() {
        assert!(Access::Allow.into_result().is_ok());
        assert!(matches!(
            Access::Loading.into_result(),
            Err(AppError::ServiceUnavailable(_))
        ));
        assert!(matches!(
            Access::Redirect {
                to: "/auth",
                from: "/admin".to_string()
            }
            .into_result(),
            Err(AppError::Unauthenticated(_))
        ));
        match (Access::Deny {
            requirement: Requirement::AdminOnly,
        })
        .into_result()
        {
            Err(AppError::Forbidden(msg)) => assert!(msg.contains("admin role")),
            other => panic!("expected forbidden, got {other:?}"),
        }
    }
}
