//! # Bookings API
//!
//! Booking submission and lifecycle. A booking starts `pending`; admins
//! drive it through the order graph (`confirm`, `complete`, `cancel`) via
//! the transition endpoint. Transitions are validated against the graph
//! and applied atomically under the store's write lock.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
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
use crate::state::{AppState, BookingRecord};

/// Request to book a property.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub property_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
}

impl Validate for CreateBookingRequest {
    fn validate(&self) -> Result<(), String> {
        if self.guest_name.trim().is_empty() {
            return Err("guest_name must be non-empty".to_string());
        }
        if self.check_out_date <= self.check_in_date {
            return Err("check_out_date must be after check_in_date".to_string());
        }
        Ok(())
    }
}

/// Request to transition a booking's status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionBookingRequest {
    /// Target status: pending, confirmed, completed, cancelled.
    pub target_status: String,
}

impl Validate for TransitionBookingRequest {
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

/// Build the bookings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings).post(create_booking))
        .route("/v1/bookings/mine", get(my_bookings))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/transition", put(transition_booking))
}

/// POST /v1/bookings — Book a property.
///
/// The check-in date must be today or later (UTC calendar date) and the
/// stay must span at least one night.
#[utoipa::path(
    post,
    path = "/v1/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking submitted", body = BookingRecord),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
        (status = 404, description = "Property not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "bookings"
)]
async fn create_booking(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingRecord>), AppError> {
    let req = extract_validated_json(body)?;

    let today = Utc::now().date_naive();
    if req.check_in_date < today {
        return Err(AppError::Validation(
            "check_in_date must not be in the past".to_string(),
        ));
    }

    if !state.properties.contains(&req.property_id.into()) {
        return Err(AppError::NotFound(format!(
            "property {} not found",
            req.property_id
        )));
    }

    let guest_email = Email::new(req.guest_email)?;
    let guest_phone = Phone::new(req.guest_phone)?;
    let now = Utc::now();

    let booking = BookingRecord {
        id: murima_core::BookingId::new(),
        property_id: req.property_id.into(),
        user_id: caller.user_id,
        guest_name: req.guest_name.trim().to_string(),
        guest_email,
        guest_phone,
        check_in_date: req.check_in_date,
        check_out_date: req.check_out_date,
        status: OrderStatus::Pending,
        transition_log: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    state.bookings.insert(booking.id, booking.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::bookings::insert(pool, &booking).await {
            tracing::error!(booking_id = %booking.id, error = %e, "failed to persist booking");
            return Err(AppError::Internal(
                "booking recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(booking_id = %booking.id, user_id = %caller.user_id, "booking submitted");
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/bookings — All bookings, newest first. Admin or moderator.
#[utoipa::path(
    get,
    path = "/v1/bookings",
    params(
        ("limit" = Option<usize>, Query, description = "Max items (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Items to skip"),
    ),
    responses(
        (status = 200, description = "All bookings", body = Vec<BookingRecord>),
        (status = 403, description = "Requires admin or moderator role", body = crate::error::ErrorBody),
    ),
    tag = "bookings"
)]
async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthState,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Vec<BookingRecord>>, AppError> {
    require(&auth, Requirement::AdminOrModerator, "/v1/bookings")?;
    let mut all = state.bookings.list();
    all.sort_by_key(|b| std::cmp::Reverse(b.created_at));
    let offset = pagination.effective_offset().min(all.len());
    let page = all
        .into_iter()
        .skip(offset)
        .take(pagination.effective_limit())
        .collect();
    Ok(Json(page))
}

/// GET /v1/bookings/mine — The caller's own bookings, newest first.
#[utoipa::path(
    get,
    path = "/v1/bookings/mine",
    responses(
        (status = 200, description = "Own bookings", body = Vec<BookingRecord>),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
    ),
    tag = "bookings"
)]
async fn my_bookings(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<Vec<BookingRecord>> {
    let mut mine: Vec<BookingRecord> = state
        .bookings
        .list()
        .into_iter()
        .filter(|b| b.user_id == caller.user_id)
        .collect();
    mine.sort_by_key(|b| std::cmp::Reverse(b.created_at));
    Json(mine)
}

/// GET /v1/bookings/{id} — Fetch one booking. The requester must own it or
/// hold the admin or moderator role.
#[utoipa::path(
    get,
    path = "/v1/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking found", body = BookingRecord),
        (status = 403, description = "Not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "bookings"
)]
async fn get_booking(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingRecord>, AppError> {
    let booking = state
        .bookings
        .get(&id.into())
        .ok_or_else(|| AppError::NotFound(format!("booking {id} not found")))?;
    if booking.user_id != caller.user_id && require_role(&caller, Role::Moderator).is_err() {
        return Err(AppError::Forbidden(
            "bookings are visible to their owner and to staff".to_string(),
        ));
    }
    Ok(Json(booking))
}

/// PUT /v1/bookings/{id}/transition — Move a booking through its lifecycle.
///
/// Admin only. The target is checked against the order graph; re-applying
/// the current status succeeds without changes so retried requests are
/// harmless. Applied transitions append to the booking's transition log.
#[utoipa::path(
    put,
    path = "/v1/bookings/{id}/transition",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = TransitionBookingRequest,
    responses(
        (status = 200, description = "Transition applied (or already in target status)", body = BookingRecord),
        (status = 403, description = "Requires admin role", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Illegal transition", body = crate::error::ErrorBody),
    ),
    tag = "bookings"
)]
async fn transition_booking(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionBookingRequest>, JsonRejection>,
) -> Result<Json<BookingRecord>, AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;
    let target = OrderStatus::parse(&req.target_status)
        .ok_or_else(|| AppError::Validation("invalid target_status".to_string()))?;

    // Atomically read-validate-update under a single write lock so two
    // rapid identical requests serialize: the first applies, the second
    // takes the idempotent same-status path.
    let updated: Result<BookingRecord, murima_state::LifecycleError> = state
        .bookings
        .try_update(&id.into(), |booking| {
            match plan_transition(booking.status, target)? {
                Planned::Noop => Ok(booking.clone()),
                Planned::Apply => {
                    booking.transition_log.push(TransitionRecord::now(
                        booking.status,
                        target,
                        caller.user_id,
                    ));
                    booking.status = target;
                    booking.updated_at = Utc::now();
                    Ok(booking.clone())
                }
            }
        })
        .ok_or_else(|| AppError::NotFound(format!("booking {id} not found")))?;
    let booking: BookingRecord = updated.map_err(AppError::from)?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::bookings::update_status(pool, &booking).await {
            tracing::error!(booking_id = %id, error = %e, "failed to persist booking transition");
            return Err(AppError::Internal(
                "transition applied in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(booking_id = %id, status = %booking.status, admin = %caller.user_id, "booking transitioned");
    Ok(Json(booking))
}
