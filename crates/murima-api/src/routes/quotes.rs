//! # Moving Quotes API
//!
//! Quote requests against moving services. Unlike bookings and purchases,
//! the quote lifecycle carries a payload: moving to `quoted` requires a
//! non-negative amount, which is stamped onto the record atomically with
//! the status change.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use murima_core::{Email, Phone, Role};
use murima_state::quote::validate_quote_amount;
use murima_state::{plan_transition, Planned, QuoteStatus, TransitionRecord};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_role, AuthState, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::gate::{require, Requirement};
use crate::routes::PaginationParams;
use crate::state::{AppState, QuoteRecord};

/// Request for a moving quote.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateQuoteRequest {
    pub service_id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub pickup_location: String,
    pub delivery_location: String,
    /// Date of the planned move (YYYY-MM-DD).
    #[schema(value_type = String, format = Date)]
    pub moving_date: NaiveDate,
    /// Free-text description of what is being moved.
    #[serde(default)]
    pub inventory: Option<String>,
}

impl Validate for CreateQuoteRequest {
    fn validate(&self) -> Result<(), String> {
        if self.client_name.trim().is_empty() {
            return Err("client_name must be non-empty".to_string());
        }
        if self.pickup_location.trim().is_empty() {
            return Err("pickup_location must be non-empty".to_string());
        }
        if self.delivery_location.trim().is_empty() {
            return Err("delivery_location must be non-empty".to_string());
        }
        if let Some(inventory) = &self.inventory {
            if inventory.len() > 2000 {
                return Err("inventory must not exceed 2000 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Request to transition a quote's status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionQuoteRequest {
    /// Target status: pending, confirmed, quoted, cancelled.
    pub target_status: String,
    /// Quoted amount in whole shillings. Required when moving to `quoted`.
    #[serde(default)]
    pub quote_amount: Option<i64>,
}

impl Validate for TransitionQuoteRequest {
    fn validate(&self) -> Result<(), String> {
        if QuoteStatus::parse(&self.target_status).is_none() {
            return Err(format!(
                "invalid target_status '{}'. Valid statuses: pending, confirmed, quoted, cancelled",
                self.target_status
            ));
        }
        Ok(())
    }
}

/// Build the quotes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/quotes", get(list_quotes).post(create_quote))
        .route("/v1/quotes/mine", get(my_quotes))
        .route("/v1/quotes/{id}/transition", put(transition_quote))
}

/// POST /v1/quotes — Request a quote from a moving service.
#[utoipa::path(
    post,
    path = "/v1/quotes",
    request_body = CreateQuoteRequest,
    responses(
        (status = 201, description = "Quote requested", body = QuoteRecord),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
        (status = 404, description = "Service not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "quotes"
)]
async fn create_quote(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateQuoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<QuoteRecord>), AppError> {
    let req = extract_validated_json(body)?;

    if !state.services.contains(&req.service_id.into()) {
        return Err(AppError::NotFound(format!(
            "moving service {} not found",
            req.service_id
        )));
    }

    let client_email = Email::new(req.client_email)?;
    let client_phone = Phone::new(req.client_phone)?;
    let now = Utc::now();

    let quote = QuoteRecord {
        id: murima_core::QuoteId::new(),
        service_id: req.service_id.into(),
        user_id: caller.user_id,
        client_name: req.client_name.trim().to_string(),
        client_email,
        client_phone,
        pickup_location: req.pickup_location.trim().to_string(),
        delivery_location: req.delivery_location.trim().to_string(),
        moving_date: req.moving_date,
        inventory: req.inventory,
        quote_amount: None,
        status: QuoteStatus::Pending,
        transition_log: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    state.quotes.insert(quote.id, quote.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::quotes::insert(pool, &quote).await {
            tracing::error!(quote_id = %quote.id, error = %e, "failed to persist quote");
            return Err(AppError::Internal(
                "quote recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(quote_id = %quote.id, client = %caller.user_id, "quote requested");
    Ok((StatusCode::CREATED, Json(quote)))
}

/// GET /v1/quotes — All quote requests, newest first. Admin or moderator.
#[utoipa::path(
    get,
    path = "/v1/quotes",
    params(
        ("limit" = Option<usize>, Query, description = "Max items (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Items to skip"),
    ),
    responses(
        (status = 200, description = "All quotes", body = Vec<QuoteRecord>),
        (status = 403, description = "Requires admin or moderator role", body = crate::error::ErrorBody),
    ),
    tag = "quotes"
)]
async fn list_quotes(
    State(state): State<AppState>,
    auth: AuthState,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Vec<QuoteRecord>>, AppError> {
    require(&auth, Requirement::AdminOrModerator, "/v1/quotes")?;
    let mut all = state.quotes.list();
    all.sort_by_key(|q| std::cmp::Reverse(q.created_at));
    let offset = pagination.effective_offset().min(all.len());
    let page = all
        .into_iter()
        .skip(offset)
        .take(pagination.effective_limit())
        .collect();
    Ok(Json(page))
}

/// GET /v1/quotes/mine — The caller's own quote requests.
#[utoipa::path(
    get,
    path = "/v1/quotes/mine",
    responses(
        (status = 200, description = "Own quotes", body = Vec<QuoteRecord>),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
    ),
    tag = "quotes"
)]
async fn my_quotes(State(state): State<AppState>, caller: CallerIdentity) -> Json<Vec<QuoteRecord>> {
    let mut mine: Vec<QuoteRecord> = state
        .quotes
        .list()
        .into_iter()
        .filter(|q| q.user_id == caller.user_id)
        .collect();
    mine.sort_by_key(|q| std::cmp::Reverse(q.created_at));
    Json(mine)
}

/// PUT /v1/quotes/{id}/transition — Move a quote through its lifecycle.
///
/// Admin only. A transition to `quoted` must carry `quote_amount`; the
/// amount is validated and stamped in the same atomic update as the
/// status change, so a reader never observes a `quoted` record without
/// its amount.
#[utoipa::path(
    put,
    path = "/v1/quotes/{id}/transition",
    params(("id" = Uuid, Path, description = "Quote ID")),
    request_body = TransitionQuoteRequest,
    responses(
        (status = 200, description = "Transition applied (or already in target status)", body = QuoteRecord),
        (status = 403, description = "Requires admin role", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Illegal transition", body = crate::error::ErrorBody),
        (status = 422, description = "Missing or invalid quote_amount", body = crate::error::ErrorBody),
    ),
    tag = "quotes"
)]
async fn transition_quote(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionQuoteRequest>, JsonRejection>,
) -> Result<Json<QuoteRecord>, AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;
    let target = QuoteStatus::parse(&req.target_status)
        .ok_or_else(|| AppError::Validation("invalid target_status".to_string()))?;

    let updated: Result<QuoteRecord, murima_state::LifecycleError> = state
        .quotes
        .try_update(&id.into(), |quote| {
            match plan_transition(quote.status, target)? {
                Planned::Noop => Ok(quote.clone()),
                Planned::Apply => {
                    let amount = validate_quote_amount(target, req.quote_amount)?;
                    quote.transition_log.push(TransitionRecord::now(
                        quote.status,
                        target,
                        caller.user_id,
                    ));
                    quote.status = target;
                    if let Some(amount) = amount {
                        quote.quote_amount = Some(amount);
                    }
                    quote.updated_at = Utc::now();
                    Ok(quote.clone())
                }
            }
        })
        .ok_or_else(|| AppError::NotFound(format!("quote {id} not found")))?;
    let quote: QuoteRecord = updated.map_err(AppError::from)?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::quotes::update_status(pool, &quote).await {
            tracing::error!(quote_id = %id, error = %e, "failed to persist quote transition");
            return Err(AppError::Internal(
                "transition applied in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(quote_id = %id, status = %quote.status, admin = %caller.user_id, "quote transitioned");
    Ok(Json(quote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use murima_core::UserId;
    use murima_listing::{MovingService, NewMovingService};
    use tower::ServiceExt;

    fn signed_in(role: Role) -> AuthState {
        AuthState::Authenticated(CallerIdentity {
            user_id: UserId::new(),
            email: Email::new("client@example.com").unwrap(),
            role,
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

    fn seed_service(state: &AppState) -> MovingService {
        let service = MovingService::create(
            NewMovingService {
                name: "Haraka Movers".to_string(),
                location: "Nairobi".to_string(),
                price_range: None,
                services: vec!["packing".to_string()],
            },
            UserId::new(),
            vec!["https://img.example/truck.jpg".to_string()],
        )
        .unwrap();
        state.services.insert(service.id, service.clone());
        service
    }

    async fn request_quote(state: &AppState, auth: AuthState, service_id: Uuid) -> QuoteRecord {
        let body = serde_json::json!({
            "service_id": service_id,
            "client_name": "Wanjiru Kamau",
            "client_email": "wanjiru@example.com",
            "client_phone": "0722000111",
            "pickup_location": "Kilimani, Nairobi",
            "delivery_location": "Runda, Nairobi",
            "moving_date": "2026-10-15",
            "inventory": "3-bedroom household, one piano",
        })
        .to_string();
        let resp = app_as(state, auth)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/quotes")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await
    }

    async fn transition(
        state: &AppState,
        auth: AuthState,
        id: murima_core::QuoteId,
        body: serde_json::Value,
    ) -> axum::response::Response {
        app_as(state, auth)
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/v1/quotes/{id}/transition"))
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn full_quoting_flow_stamps_amount() {
        let state = AppState::new();
        let service = seed_service(&state);
        let quote = request_quote(&state, signed_in(Role::User), *service.id.as_uuid()).await;
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert_eq!(quote.quote_amount, None);

        let admin = signed_in(Role::Admin);
        let resp = transition(
            &state,
            admin.clone(),
            quote.id,
            serde_json::json!({"target_status": "confirmed"}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = transition(
            &state,
            admin,
            quote.id,
            serde_json::json!({"target_status": "quoted", "quote_amount": 50000}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let quoted: QuoteRecord = body_json(resp).await;
        assert_eq!(quoted.status, QuoteStatus::Quoted);
        assert_eq!(quoted.quote_amount, Some(50_000));
        assert_eq!(quoted.transition_log.len(), 2);
    }

    #[tokio::test]
    async fn quoted_without_amount_is_rejected_and_state_unchanged() {
        let state = AppState::new();
        let service = seed_service(&state);
        let quote = request_quote(&state, signed_in(Role::User), *service.id.as_uuid()).await;
        let admin = signed_in(Role::Admin);
        transition(
            &state,
            admin.clone(),
            quote.id,
            serde_json::json!({"target_status": "confirmed"}),
        )
        .await;

        let resp = transition(
            &state,
            admin,
            quote.id,
            serde_json::json!({"target_status": "quoted"}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let stored = state.quotes.get(&quote.id).unwrap();
        assert_eq!(stored.status, QuoteStatus::Confirmed);
        assert_eq!(stored.quote_amount, None);
    }

    #[tokio::test]
    async fn negative_amount_is_rejected() {
        let state = AppState::new();
        let service = seed_service(&state);
        let quote = request_quote(&state, signed_in(Role::User), *service.id.as_uuid()).await;
        let admin = signed_in(Role::Admin);
        transition(
            &state,
            admin.clone(),
            quote.id,
            serde_json::json!({"target_status": "confirmed"}),
        )
        .await;

        let resp = transition(
            &state,
            admin,
            quote.id,
            serde_json::json!({"target_status": "quoted", "quote_amount": -500}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn quoted_is_terminal() {
        let state = AppState::new();
        let service = seed_service(&state);
        let quote = request_quote(&state, signed_in(Role::User), *service.id.as_uuid()).await;
        let admin = signed_in(Role::Admin);
        for body in [
            serde_json::json!({"target_status": "confirmed"}),
            serde_json::json!({"target_status": "quoted", "quote_amount": 42000}),
        ] {
            let resp = transition(&state, admin.clone(), quote.id, body).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let resp = transition(
            &state,
            admin,
            quote.id,
            serde_json::json!({"target_status": "pending"}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn quote_against_unknown_service_is_404() {
        let state = AppState::new();
        let body = serde_json::json!({
            "service_id": Uuid::new_v4(),
            "client_name": "Wanjiru Kamau",
            "client_email": "wanjiru@example.com",
            "client_phone": "0722000111",
            "pickup_location": "Kilimani",
            "delivery_location": "Runda",
            "moving_date": "2026-10-15",
        })
        .to_string();
        let resp = app_as(&state, signed_in(Role::User))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/quotes")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(state.quotes.is_empty());
    }

    #[tokio::test]
    async fn moderator_cannot_transition() {
        let state = AppState::new();
        let service = seed_service(&state);
        let quote = request_quote(&state, signed_in(Role::User), *service.id.as_uuid()).await;
        let resp = transition(
            &state,
            signed_in(Role::Moderator),
            quote.id,
            serde_json::json!({"target_status": "confirmed"}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
