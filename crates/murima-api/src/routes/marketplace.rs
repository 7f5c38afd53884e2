//! # Marketplace Items API
//!
//! Peer-to-peer item listings. Same creation contract as properties:
//! images first, all-or-nothing, then the record.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use murima_core::Role;
use murima_listing::{ItemCondition, MarketplaceFilter, MarketplaceItem, NewMarketplaceItem};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::{store_images, validate_image_batch, ImageFile, PaginationParams};
use crate::state::AppState;

/// Request to list an item for sale.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub title: String,
    pub category: String,
    /// `new`, `like_new`, `good`, or `fair`.
    pub condition: String,
    /// Price in whole shillings.
    pub price: i64,
    pub location: String,
    pub images: Vec<ImageFile>,
}

impl Validate for CreateItemRequest {
    fn validate(&self) -> Result<(), String> {
        if ItemCondition::parse(&self.condition).is_none() {
            return Err(format!(
                "invalid condition '{}'. Valid conditions: new, like_new, good, fair",
                self.condition
            ));
        }
        validate_image_batch(&self.images)
    }
}

/// Build the marketplace router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/marketplace/items",
            get(list_items).post(create_item),
        )
        .route(
            "/v1/marketplace/items/{id}",
            get(get_item).delete(delete_item),
        )
}

/// POST /v1/marketplace/items — List an item for sale.
#[utoipa::path(
    post,
    path = "/v1/marketplace/items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item listed", body = Object),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request or image upload failed", body = crate::error::ErrorBody),
    ),
    tag = "marketplace"
)]
async fn create_item(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MarketplaceItem>), AppError> {
    let req = extract_validated_json(body)?;
    let condition = ItemCondition::parse(&req.condition)
        .ok_or_else(|| AppError::Validation("invalid condition".to_string()))?;

    let urls = store_images(&state, caller.user_id, "marketplace", &req.images).await?;

    let item = MarketplaceItem::create(
        NewMarketplaceItem {
            title: req.title,
            category: req.category,
            condition,
            price: req.price,
            location: req.location,
        },
        caller.user_id,
        urls,
    )?;

    state.items.insert(item.id, item.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::marketplace::insert(pool, &item).await {
            tracing::error!(item_id = %item.id, error = %e, "failed to persist item");
            return Err(AppError::Internal(
                "item recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /v1/marketplace/items — Search items.
///
/// Free text matches title or location; other criteria are conjunctive.
#[utoipa::path(
    get,
    path = "/v1/marketplace/items",
    params(
        ("query" = Option<String>, Query, description = "Free text over title and location"),
        ("category" = Option<String>, Query, description = "Exact category"),
        ("condition" = Option<String>, Query, description = "new | like_new | good | fair"),
        ("price_max" = Option<i64>, Query, description = "Inclusive upper price bound"),
        ("limit" = Option<usize>, Query, description = "Max items (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Items to skip"),
    ),
    responses(
        (status = 200, description = "Matching items", body = Vec<Object>),
    ),
    tag = "marketplace"
)]
async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<MarketplaceFilter>,
    Query(pagination): Query<PaginationParams>,
) -> Json<Vec<MarketplaceItem>> {
    let mut all: Vec<MarketplaceItem> = state
        .items
        .list()
        .into_iter()
        .filter(|i| filter.matches(i))
        .collect();
    all.sort_by_key(|i| std::cmp::Reverse(i.created_at));
    let offset = pagination.effective_offset().min(all.len());
    let page = all
        .into_iter()
        .skip(offset)
        .take(pagination.effective_limit())
        .collect();
    Json(page)
}

/// GET /v1/marketplace/items/{id} — Fetch an item.
#[utoipa::path(
    get,
    path = "/v1/marketplace/items/{id}",
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item found", body = Object),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "marketplace"
)]
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MarketplaceItem>, AppError> {
    state
        .items
        .get(&id.into())
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("item {id} not found")))
}

/// DELETE /v1/marketplace/items/{id} — Hard-delete an item. Admin only.
#[utoipa::path(
    delete,
    path = "/v1/marketplace/items/{id}",
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Requires admin role", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "marketplace"
)]
async fn delete_item(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Admin)?;
    state
        .items
        .remove(&id.into())
        .ok_or_else(|| AppError::NotFound(format!("item {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::marketplace::delete(pool, id).await {
            tracing::error!(item_id = %id, error = %e, "failed to delete item from database");
            return Err(AppError::Internal(
                "item removed in-memory but database delete failed".to_string(),
            ));
        }
    }

    tracing::info!(item_id = %id, admin = %caller.user_id, "marketplace item deleted");
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

    fn seller() -> AuthState {
        AuthState::Authenticated(CallerIdentity {
            user_id: UserId::new(),
            email: Email::new("seller@example.com").unwrap(),
            role: Role::User,
        })
    }

    fn app_as(state: &AppState, auth: AuthState) -> Router {
        router()
            .layer(axum::Extension(auth))
            .with_state(state.clone())
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn create_body(title: &str) -> String {
        serde_json::json!({
            "title": title,
            "category": "furniture",
            "condition": "good",
            "price": 24000,
            "location": "Nairobi",
            "images": [{"name": "table.jpg", "data_hex": "ffd8ff"}],
        })
        .to_string()
    }

    #[tokio::test]
    async fn create_and_search_by_free_text() {
        let state = AppState::new();
        let resp = app_as(&state, seller())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/marketplace/items")
                    .header("content-type", "application/json")
                    .body(Body::from(create_body("Mahogany dining table")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let hits = app_as(&state, AuthState::Anonymous)
            .oneshot(
                Request::builder()
                    .uri("/v1/marketplace/items?query=table")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let items: Vec<MarketplaceItem> = body_json(hits).await;
        assert_eq!(items.len(), 1);

        let misses = app_as(&state, AuthState::Anonymous)
            .oneshot(
                Request::builder()
                    .uri("/v1/marketplace/items?query=sofa")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let items: Vec<MarketplaceItem> = body_json(misses).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_unknown_condition() {
        let state = AppState::new();
        let body = create_body("TV").replace("good", "mint");
        let resp = app_as(&state, seller())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/marketplace/items")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.items.is_empty());
    }
}
