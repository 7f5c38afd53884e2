//! # Profiles API
//!
//! Self-service profile editing plus the admin user-management surface.
//! Role is only ever changed through the admin endpoint here; nothing in
//! the self-service path can touch it.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use murima_core::{Phone, Profile, Role, UserId};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_role, AuthState, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::gate::{require, Requirement};
use crate::routes::PaginationParams;
use crate::state::AppState;

/// Self-service profile update. Absent fields are left unchanged; role
/// and verification are deliberately not part of this request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                return Err("full_name must be non-empty".to_string());
            }
        }
        if let Some(username) = &self.username {
            if username.len() > 50 {
                return Err("username must not exceed 50 characters".to_string());
            }
        }
        if let Some(bio) = &self.bio {
            if bio.len() > 1000 {
                return Err("bio must not exceed 1000 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Admin request to change a user's role.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    /// `user`, `moderator`, or `admin`.
    pub role: String,
}

impl Validate for ChangeRoleRequest {
    fn validate(&self) -> Result<(), String> {
        if Role::parse(&self.role).is_none() {
            return Err(format!(
                "invalid role '{}'. Valid roles: user, moderator, admin",
                self.role
            ));
        }
        Ok(())
    }
}

/// Admin request to set the verification badge.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetVerifiedRequest {
    pub is_verified: bool,
}

impl Validate for SetVerifiedRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Build the profiles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/profiles", get(list_profiles))
        .route("/v1/profiles/me", get(my_profile).put(update_my_profile))
        .route("/v1/profiles/{id}/role", put(change_role))
        .route("/v1/profiles/{id}/verify", put(set_verified))
}

/// GET /v1/profiles/me — The caller's own profile.
#[utoipa::path(
    get,
    path = "/v1/profiles/me",
    responses(
        (status = 200, description = "Own profile", body = Object),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
    ),
    tag = "profiles"
)]
async fn my_profile(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Profile>, AppError> {
    state
        .profiles
        .get(&caller.user_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("profile not found".to_string()))
}

/// PUT /v1/profiles/me — Update the caller's own profile fields.
#[utoipa::path(
    put,
    path = "/v1/profiles/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = Object),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "profiles"
)]
async fn update_my_profile(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<Profile>, AppError> {
    let req = extract_validated_json(body)?;
    // Phone format is checked before taking the write lock.
    let phone = match req.phone {
        Some(raw) => Some(Phone::new(raw)?),
        None => None,
    };

    let updated = state
        .profiles
        .try_update(&caller.user_id, |profile| -> Result<Profile, AppError> {
            if let Some(username) = req.username {
                profile.username = Some(username);
            }
            if let Some(full_name) = req.full_name {
                profile.full_name = full_name;
            }
            if let Some(phone) = phone {
                profile.phone = Some(phone);
            }
            if let Some(avatar_url) = req.avatar_url {
                profile.avatar_url = Some(avatar_url);
            }
            if let Some(bio) = req.bio {
                profile.bio = Some(bio);
            }
            profile.updated_at = Utc::now();
            Ok(profile.clone())
        })
        .ok_or_else(|| AppError::NotFound("profile not found".to_string()))?;
    let profile = updated?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::profiles::update(pool, &profile).await {
            tracing::error!(user_id = %profile.id, error = %e, "failed to persist profile update");
            return Err(AppError::Internal(
                "profile updated in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok(Json(profile))
}

/// GET /v1/profiles — List all profiles. Admin only.
#[utoipa::path(
    get,
    path = "/v1/profiles",
    params(
        ("limit" = Option<usize>, Query, description = "Max items (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Items to skip"),
    ),
    responses(
        (status = 200, description = "All profiles", body = Vec<Object>),
        (status = 403, description = "Requires admin role", body = crate::error::ErrorBody),
    ),
    tag = "profiles"
)]
async fn list_profiles(
    State(state): State<AppState>,
    auth: AuthState,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Vec<Profile>>, AppError> {
    require(&auth, Requirement::AdminOnly, "/v1/profiles")?;
    let mut all = state.profiles.list();
    all.sort_by_key(|p| std::cmp::Reverse(p.created_at));
    let offset = pagination.effective_offset().min(all.len());
    let page = all
        .into_iter()
        .skip(offset)
        .take(pagination.effective_limit())
        .collect();
    Ok(Json(page))
}

/// PUT /v1/profiles/{id}/role — Change a user's role. Admin only; this is
/// the only path by which a role can change.
#[utoipa::path(
    put,
    path = "/v1/profiles/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Updated profile", body = Object),
        (status = 403, description = "Requires admin role", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown role", body = crate::error::ErrorBody),
    ),
    tag = "profiles"
)]
async fn change_role(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<ChangeRoleRequest>, JsonRejection>,
) -> Result<Json<Profile>, AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;
    let role = Role::parse(&req.role)
        .ok_or_else(|| AppError::Validation("invalid role".to_string()))?;

    let target_id = UserId::from_uuid(id);
    let updated = state
        .profiles
        .try_update(&target_id, |profile| -> Result<Profile, AppError> {
            profile.role = role;
            profile.updated_at = Utc::now();
            Ok(profile.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("profile {id} not found")))?;
    let profile = updated?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::profiles::update(pool, &profile).await {
            tracing::error!(user_id = %id, error = %e, "failed to persist role change");
            return Err(AppError::Internal(
                "role changed in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(user_id = %id, role = %profile.role, admin = %caller.user_id, "role changed");
    Ok(Json(profile))
}

/// PUT /v1/profiles/{id}/verify — Set the verification badge. Admin only.
#[utoipa::path(
    put,
    path = "/v1/profiles/{id}/verify",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SetVerifiedRequest,
    responses(
        (status = 200, description = "Updated profile", body = Object),
        (status = 403, description = "Requires admin role", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "profiles"
)]
async fn set_verified(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<SetVerifiedRequest>, JsonRejection>,
) -> Result<Json<Profile>, AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;

    let target_id = UserId::from_uuid(id);
    let updated = state
        .profiles
        .try_update(&target_id, |profile| -> Result<Profile, AppError> {
            profile.is_verified = req.is_verified;
            profile.updated_at = Utc::now();
            Ok(profile.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("profile {id} not found")))?;
    let profile = updated?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::profiles::update(pool, &profile).await {
            tracing::error!(user_id = %id, error = %e, "failed to persist verification change");
            return Err(AppError::Internal(
                "verification changed in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok(Json(profile))
}
