//! # Session Authentication
//!
//! Opaque bearer tokens resolved against the in-memory session store. The
//! caller's role is read from their profile row on every request — never
//! from the token — so a role change takes effect on the next request
//! without re-issuing sessions.
//!
//! Passwords are stored as salted SHA-256 digests; tokens and salts come
//! from the OS RNG via `rand`.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use murima_core::{Email, Role, UserId};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::state::AppState;

/// Stored password verifier: salted SHA-256 digest, both parts hex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub user_id: UserId,
    pub salt: String,
    pub digest: String,
}

impl CredentialRecord {
    pub fn create(user_id: UserId, password: &str) -> Self {
        let mut salt_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = hex::encode(salt_bytes);
        let digest = salted_digest(&salt, password);
        Self {
            user_id,
            salt,
            digest,
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        salted_digest(&self.salt, password) == self.digest
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// An issued session. The token is the store key and the only client-held
/// secret; it carries no claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn issue(user_id: UserId) -> Self {
        let mut token_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut token_bytes);
        Self {
            token: hex::encode(token_bytes),
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// The authenticated caller, resolved by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub email: Email,
    pub role: Role,
}

/// Per-request authentication outcome, inserted as a request extension.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// No token, or a token that resolves to no session.
    Anonymous,
    /// Session is valid but the profile row is not available yet; the
    /// caller's role is unknown. Never grants access.
    Resolving { user_id: UserId },
    /// Fully resolved caller.
    Authenticated(CallerIdentity),
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthState>() {
            Some(AuthState::Authenticated(caller)) => Ok(caller.clone()),
            Some(AuthState::Resolving { .. }) => Err(AppError::ServiceUnavailable(
                "caller role is still being resolved".to_string(),
            )),
            _ => Err(AppError::Unauthenticated(
                "missing or invalid session token".to_string(),
            )),
        }
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthState>()
            .cloned()
            .unwrap_or(AuthState::Anonymous))
    }
}

/// Check the caller's role against a route requirement.
///
/// `Admin` requires the admin role exactly; `Moderator` accepts admins too
/// (moderation is a subset of administration); `User` accepts any
/// authenticated caller.
pub fn require_role(caller: &CallerIdentity, required: Role) -> Result<(), AppError> {
    let satisfied = match required {
        Role::Admin => caller.role.is_admin(),
        Role::Moderator => caller.role.can_moderate(),
        Role::User => true,
    };
    if satisfied {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "requires the {} role",
            required.as_str()
        )))
    }
}

/// Extract the bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the caller for every request and attach an [`AuthState`]
/// extension. Resolution never rejects here — routes decide what level of
/// authentication they require via the extractors above.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth = resolve(&state, request.headers());
    request.extensions_mut().insert(auth);
    next.run(request).await
}

fn resolve(state: &AppState, headers: &HeaderMap) -> AuthState {
    let Some(token) = bearer_token(headers) else {
        return AuthState::Anonymous;
    };
    let Some(session) = state.sessions.get(&token.to_string()) else {
        tracing::debug!("bearer token does not match any session");
        return AuthState::Anonymous;
    };
    match state.profiles.get(&session.user_id) {
        Some(profile) => AuthState::Authenticated(CallerIdentity {
            user_id: profile.id,
            email: profile.email,
            role: profile.role,
        }),
        None => {
            tracing::warn!(user_id = %session.user_id, "session resolved but profile row missing");
            AuthState::Resolving {
                user_id: session.user_id,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murima_core::Profile;

    fn caller(role: Role) -> CallerIdentity {
        CallerIdentity {
            user_id: UserId::new(),
            email: Email::new("test@example.com").unwrap(),
            role,
        }
    }

    #[test]
    fn credential_verifies_correct_password() {
        let cred = CredentialRecord::create(UserId::new(), "hunter22-correct");
        assert!(cred.verify("hunter22-correct"));
        assert!(!cred.verify("hunter22-wrong"));
    }

    #[test]
    fn salts_differ_between_records() {
        let a = CredentialRecord::create(UserId::new(), "same-password");
        let b = CredentialRecord::create(UserId::new(), "same-password");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn session_tokens_are_64_hex_chars_and_unique() {
        let a = Session::issue(UserId::new());
        let b = Session::issue(UserId::new());
        assert_eq!(a.token.len(), 64);
        assert!(a.token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn require_role_admin_gate() {
        assert!(require_role(&caller(Role::Admin), Role::Admin).is_ok());
        assert!(require_role(&caller(Role::Moderator), Role::Admin).is_err());
        assert!(require_role(&caller(Role::User), Role::Admin).is_err());
    }

    #[test]
    fn require_role_moderator_gate_admits_admin() {
        assert!(require_role(&caller(Role::Admin), Role::Moderator).is_ok());
        assert!(require_role(&caller(Role::Moderator), Role::Moderator).is_ok());
        assert!(require_role(&caller(Role::User), Role::Moderator).is_err());
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));

        let mut bad = HeaderMap::new();
        bad.insert(header::AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert_eq!(bearer_token(&bad), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn resolve_maps_token_to_profile_role() {
        let state = AppState::new();
        let profile = Profile::for_registration(
            UserId::new(),
            "Test User".to_string(),
            Email::new("user@example.com").unwrap(),
        );
        let session = Session::issue(profile.id);
        state.profiles.insert(profile.id, profile.clone());
        state.sessions.insert(session.token.clone(), session.clone());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", session.token).parse().unwrap(),
        );
        match resolve(&state, &headers) {
            AuthState::Authenticated(caller) => {
                assert_eq!(caller.user_id, profile.id);
                assert_eq!(caller.role, Role::User);
            }
            other => panic!("expected authenticated, got {other:?}"),
        }
    }

    #[test]
    fn resolve_without_profile_is_resolving() {
        let state = AppState::new();
        let session = Session::issue(UserId::new());
        state.sessions.insert(session.token.clone(), session.clone());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", session.token).parse().unwrap(),
        );
        assert!(matches!(
            resolve(&state, &headers),
            AuthState::Resolving { .. }
        ));
    }

    #[test]
    fn resolve_unknown_token_is_anonymous() {
        let state = AppState::new();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer deadbeef".parse().unwrap());
        assert!(matches!(resolve(&state, &headers), AuthState::Anonymous));
    }
}
