//! # Moving Services API
//!
//! The movers directory. Entries start unverified; the verification badge
//! is toggled through the admin profile surface, not here.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use murima_core::Role;
use murima_listing::{MovingService, NewMovingService};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::{store_images, validate_image_batch, ImageFile, PaginationParams};
use crate::state::AppState;

/// Request to add a mover to the directory.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMoverRequest {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    pub images: Vec<ImageFile>,
}

impl Validate for CreateMoverRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must be non-empty".to_string());
        }
        validate_image_batch(&self.images)
    }
}

/// Build the movers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/movers", get(list_movers).post(create_mover))
        .route("/v1/movers/{id}", get(get_mover).delete(delete_mover))
}

/// POST /v1/movers — Add a moving service to the directory.
#[utoipa::path(
    post,
    path = "/v1/movers",
    request_body = CreateMoverRequest,
    responses(
        (status = 201, description = "Service added", body = Object),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request or image upload failed", body = crate::error::ErrorBody),
    ),
    tag = "movers"
)]
async fn create_mover(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateMoverRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MovingService>), AppError> {
    let req = extract_validated_json(body)?;

    let urls = store_images(&state, caller.user_id, "movers", &req.images).await?;

    let service = MovingService::create(
        NewMovingService {
            name: req.name,
            location: req.location,
            price_range: req.price_range,
            services: req.services,
        },
        caller.user_id,
        urls,
    )?;

    state.services.insert(service.id, service.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::movers::insert(pool, &service).await {
            tracing::error!(service_id = %service.id, error = %e, "failed to persist moving service");
            return Err(AppError::Internal(
                "service recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok((StatusCode::CREATED, Json(service)))
}

/// GET /v1/movers — List the movers directory, newest first.
#[utoipa::path(
    get,
    path = "/v1/movers",
    params(
        ("limit" = Option<usize>, Query, description = "Max items (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Items to skip"),
    ),
    responses(
        (status = 200, description = "Moving services", body = Vec<Object>),
    ),
    tag = "movers"
)]
async fn list_movers(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Json<Vec<MovingService>> {
    let mut all = state.services.list();
    all.sort_by_key(|s| std::cmp::Reverse(s.created_at));
    let offset = pagination.effective_offset().min(all.len());
    let page = all
        .into_iter()
        .skip(offset)
        .take(pagination.effective_limit())
        .collect();
    Json(page)
}

/// GET /v1/movers/{id} — Fetch a moving service.
#[utoipa::path(
    get,
    path = "/v1/movers/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service found", body = Object),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "movers"
)]
async fn get_mover(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MovingService>, AppError> {
    state
        .services
        .get(&id.into())
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("moving service {id} not found")))
}

/// DELETE /v1/movers/{id} — Remove a service from the directory. Admin only.
#[utoipa::path(
    delete,
    path = "/v1/movers/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 204, description = "Service removed"),
        (status = 403, description = "Requires admin role", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "movers"
)]
async fn delete_mover(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Admin)?;
    state
        .services
        .remove(&id.into())
        .ok_or_else(|| AppError::NotFound(format!("moving service {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::movers::delete(pool, id).await {
            tracing::error!(service_id = %id, error = %e, "failed to delete moving service from database");
            return Err(AppError::Internal(
                "service removed in-memory but database delete failed".to_string(),
            ));
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthState;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use murima_core::{Email, UserId};
    use tower::ServiceExt;

    fn owner() -> AuthState {
        AuthState::Authenticated(CallerIdentity {
            user_id: UserId::new(),
            email: Email::new("mover@example.com").unwrap(),
            role: Role::User,
        })
    }

    fn app_as(state: &AppState, auth: AuthState) -> Router {
        router()
            .layer(axum::Extension(auth))
            .with_state(state.clone())
    }

    #[tokio::test]
    async fn create_starts_unverified() {
        let state = AppState::new();
        let body = serde_json::json!({
            "name": "Haraka Movers",
            "location": "Mombasa Road, Nairobi",
            "price_range": "KSh 15,000 - 40,000",
            "services": ["packing", "storage"],
            "images": [{"name": "truck.jpg", "data_hex": "ffd8ff"}],
        })
        .to_string();
        let resp = app_as(&state, owner())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/movers")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let service: MovingService = serde_json::from_slice(&bytes).unwrap();
        assert!(!service.verified);
        assert_eq!(service.services, vec!["packing", "storage"]);
    }

    #[tokio::test]
    async fn get_unknown_service_is_404() {
        let state = AppState::new();
        let resp = app_as(&state, AuthState::Anonymous)
            .oneshot(
                Request::builder()
                    .uri(format!("/v1/movers/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
