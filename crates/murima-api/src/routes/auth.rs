//! # Authentication API
//!
//! Registration, login, logout, and the current-caller probe. Registration
//! creates the identity, its `user`-role profile, and an initial session in
//! one step, matching the sign-up flow of the web client.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use murima_core::{Email, Profile};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{bearer_token, CallerIdentity, CredentialRecord, Session};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

/// Registration request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("full_name must be non-empty".to_string());
        }
        if self.full_name.len() > 255 {
            return Err("full_name must not exceed 255 characters".to_string());
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        Ok(())
    }
}

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() {
            return Err("email must be non-empty".to_string());
        }
        if self.password.is_empty() {
            return Err("password must be non-empty".to_string());
        }
        Ok(())
    }
}

/// Successful registration or login: the session token plus the profile.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Opaque bearer token for the `Authorization` header.
    pub token: String,
    #[schema(value_type = Object)]
    pub profile: Profile,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/logout", post(logout))
        .route("/v1/auth/me", get(me))
}

/// POST /v1/auth/register — Create an account and sign in.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let email = Email::new(req.email)?;
    let email_key = email.as_str().to_string();

    if state.credentials.contains(&email_key) {
        return Err(AppError::Conflict(format!(
            "an account already exists for {email}"
        )));
    }

    let profile = Profile::for_registration(
        murima_core::UserId::new(),
        req.full_name.trim().to_string(),
        email,
    );
    let credential = CredentialRecord::create(profile.id, &req.password);
    let session = Session::issue(profile.id);

    state.profiles.insert(profile.id, profile.clone());
    state.credentials.insert(email_key, credential);
    state
        .sessions
        .insert(session.token.clone(), session.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::profiles::insert(pool, &profile).await {
            tracing::error!(user_id = %profile.id, error = %e, "failed to persist profile");
            return Err(AppError::Internal(
                "account created in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(user_id = %profile.id, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: session.token,
            profile,
        }),
    ))
}

/// POST /v1/auth/login — Exchange credentials for a session token.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let req = extract_validated_json(body)?;
    // Normalize the same way registration did so lookups agree.
    let email = Email::new(req.email)?;

    // Same error for unknown email and wrong password; do not reveal which.
    let invalid = || AppError::Unauthenticated("invalid email or password".to_string());

    let credential = state
        .credentials
        .get(&email.as_str().to_string())
        .ok_or_else(invalid)?;
    if !credential.verify(&req.password) {
        return Err(invalid());
    }
    let profile = state
        .profiles
        .get(&credential.user_id)
        .ok_or_else(|| AppError::ServiceUnavailable("profile not yet available".to_string()))?;

    let session = Session::issue(profile.id);
    state
        .sessions
        .insert(session.token.clone(), session.clone());

    tracing::info!(user_id = %profile.id, "signed in");
    Ok(Json(AuthResponse {
        token: session.token,
        profile,
    }))
}

/// POST /v1/auth/logout — Revoke the presented session token.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "No valid session", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn logout(
    State(state): State<AppState>,
    caller: CallerIdentity,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthenticated("missing session token".to_string()))?;
    state.sessions.remove(&token.to_string());
    tracing::info!(user_id = %caller.user_id, "signed out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/auth/me — The signed-in caller's profile.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Current profile", body = Object),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn me(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Profile>, AppError> {
    state
        .profiles
        .get(&caller.user_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("profile {} not found", caller.user_id)))
}
