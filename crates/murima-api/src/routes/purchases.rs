//! # Purchases API
//!
//! Marketplace purchase submission and lifecycle. The purchase price is
//! copied from the item at submission time; later edits to the item do not
//! change what the buyer agreed to pay.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use murima_core::{Email, Phone, Role};
use murima_state::{plan_transition, OrderStatus, Planned, TransitionRecord};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_role, AuthState, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::gate::{require, Requirement};
use crate::routes::PaginationParams;
use crate::state::{AppState, PurchaseRecord};

/// Request to buy a marketplace item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePurchaseRequest {
    pub item_id: Uuid,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_phone: String,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

impl Validate for CreatePurchaseRequest {
    fn validate(&self) -> Result<(), String> {
        if self.buyer_name.trim().is_empty() {
            return Err("buyer_name must be non-empty".to_string());
        }
        if let Some(address) = &self.delivery_address {
            if address.len() > 500 {
                return Err("delivery_address must not exceed 500 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Request to transition a purchase's status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionPurchaseRequest {
    /// Target status: pending, confirmed, completed, cancelled.
    pub target_status: String,
}

impl Validate for TransitionPurchaseRequest {
    fn validate(&self) -> Result<(), String> {
        if OrderStatus::parse(&self.target_status).is_none() {
            return Err(format!(
                "invalid target_status '{}'. Valid statuses: pending, confirmed, completed, cancelled",
                self.target_status
            ));
        }
        Ok(())
    }
}

/// Build the purchases router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/purchases", get(list_purchases).post(create_purchase))
        .route("/v1/purchases/mine", get(my_purchases))
        .route("/v1/purchases/sales", get(my_sales))
        .route("/v1/purchases/{id}/transition", put(transition_purchase))
}

/// POST /v1/purchases — Buy a marketplace item.
#[utoipa::path(
    post,
    path = "/v1/purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase submitted", body = PurchaseRecord),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
        (status = 404, description = "Item not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "purchases"
)]
async fn create_purchase(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreatePurchaseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PurchaseRecord>), AppError> {
    let req = extract_validated_json(body)?;

    let item = state
        .items
        .get(&req.item_id.into())
        .ok_or_else(|| AppError::NotFound(format!("item {} not found", req.item_id)))?;

    let buyer_email = Email::new(req.buyer_email)?;
    let buyer_phone = Phone::new(req.buyer_phone)?;
    let now = Utc::now();

    let purchase = PurchaseRecord {
        id: murima_core::PurchaseId::new(),
        item_id: item.id,
        buyer_id: caller.user_id,
        seller_id: item.created_by,
        purchase_price: item.price,
        buyer_name: req.buyer_name.trim().to_string(),
        buyer_email,
        buyer_phone,
        delivery_address: req.delivery_address,
        status: OrderStatus::Pending,
        transition_log: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    state.purchases.insert(purchase.id, purchase.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::purchases::insert(pool, &purchase).await {
            tracing::error!(purchase_id = %purchase.id, error = %e, "failed to persist purchase");
            return Err(AppError::Internal(
                "purchase recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(purchase_id = %purchase.id, buyer = %caller.user_id, "purchase submitted");
    Ok((StatusCode::CREATED, Json(purchase)))
}

/// GET /v1/purchases — All purchases, newest first. Admin or moderator.
#[utoipa::path(
    get,
    path = "/v1/purchases",
    params(
        ("limit" = Option<usize>, Query, description = "Max items (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Items to skip"),
    ),
    responses(
        (status = 200, description = "All purchases", body = Vec<PurchaseRecord>),
        (status = 403, description = "Requires admin or moderator role", body = crate::error::ErrorBody),
    ),
    tag = "purchases"
)]
async fn list_purchases(
    State(state): State<AppState>,
    auth: AuthState,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Vec<PurchaseRecord>>, AppError> {
    require(&auth, Requirement::AdminOrModerator, "/v1/purchases")?;
    let mut all = state.purchases.list();
    all.sort_by_key(|p| std::cmp::Reverse(p.created_at));
    let offset = pagination.effective_offset().min(all.len());
    let page = all
        .into_iter()
        .skip(offset)
        .take(pagination.effective_limit())
        .collect();
    Ok(Json(page))
}

/// GET /v1/purchases/mine — Purchases where the caller is the buyer.
#[utoipa::path(
    get,
    path = "/v1/purchases/mine",
    responses(
        (status = 200, description = "Own purchases", body = Vec<PurchaseRecord>),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
    ),
    tag = "purchases"
)]
async fn my_purchases(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<Vec<PurchaseRecord>> {
    let mut mine: Vec<PurchaseRecord> = state
        .purchases
        .list()
        .into_iter()
        .filter(|p| p.buyer_id == caller.user_id)
        .collect();
    mine.sort_by_key(|p| std::cmp::Reverse(p.created_at));
    Json(mine)
}

/// GET /v1/purchases/sales — Purchases where the caller is the seller.
#[utoipa::path(
    get,
    path = "/v1/purchases/sales",
    responses(
        (status = 200, description = "Own sales", body = Vec<PurchaseRecord>),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
    ),
    tag = "purchases"
)]
async fn my_sales(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<Vec<PurchaseRecord>> {
    let mut sales: Vec<PurchaseRecord> = state
        .purchases
        .list()
        .into_iter()
        .filter(|p| p.seller_id == caller.user_id)
        .collect();
    sales.sort_by_key(|p| std::cmp::Reverse(p.created_at));
    Json(sales)
}

/// PUT /v1/purchases/{id}/transition — Move a purchase through its
/// lifecycle. Admin only; same graph and idempotency rules as bookings.
#[utoipa::path(
    put,
    path = "/v1/purchases/{id}/transition",
    params(("id" = Uuid, Path, description = "Purchase ID")),
    request_body = TransitionPurchaseRequest,
    responses(
        (status = 200, description = "Transition applied (or already in target status)", body = PurchaseRecord),
        (status = 403, description = "Requires admin role", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Illegal transition", body = crate::error::ErrorBody),
    ),
    tag = "purchases"
)]
async fn transition_purchase(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionPurchaseRequest>, JsonRejection>,
) -> Result<Json<PurchaseRecord>, AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;
    let target = OrderStatus::parse(&req.target_status)
        .ok_or_else(|| AppError::Validation("invalid target_status".to_string()))?;

    let updated: Result<PurchaseRecord, murima_state::LifecycleError> = state
        .purchases
        .try_update(&id.into(), |purchase| {
            match plan_transition(purchase.status, target)? {
                Planned::Noop => Ok(purchase.clone()),
                Planned::Apply => {
                    purchase.transition_log.push(TransitionRecord::now(
                        purchase.status,
                        target,
                        caller.user_id,
                    ));
                    purchase.status = target;
                    purchase.updated_at = Utc::now();
                    Ok(purchase.clone())
                }
            }
        })
        .ok_or_else(|| AppError::NotFound(format!("purchase {id} not found")))?;
    let purchase: PurchaseRecord = updated.map_err(AppError::from)?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::purchases::update_status(pool, &purchase).await {
            tracing::error!(purchase_id = %id, error = %e, "failed to persist purchase transition");
            return Err(AppError::Internal(
                "transition applied in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(purchase_id = %id, status = %purchase.status, admin = %caller.user_id, "purchase transitioned");
    Ok(Json(purchase))
}
