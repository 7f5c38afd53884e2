//! # murima-api — Axum API Services for the Murima Marketplace
//!
//! REST layer over the marketplace domain crates: property listings,
//! peer-to-peer marketplace items, a movers directory, and the three
//! transaction lifecycles (bookings, purchases, moving quotes).
//!
//! ## API Surface
//!
//! | Prefix                  | Module                   | Domain                  |
//! |-------------------------|--------------------------|-------------------------|
//! | `/v1/auth/*`            | [`routes::auth`]         | Registration & sessions |
//! | `/v1/properties/*`      | [`routes::properties`]   | Property listings       |
//! | `/v1/marketplace/*`     | [`routes::marketplace`]  | Marketplace items       |
//! | `/v1/movers/*`          | [`routes::movers`]       | Moving services         |
//! | `/v1/bookings/*`        | [`routes::bookings`]     | Booking lifecycle       |
//! | `/v1/purchases/*`       | [`routes::purchases`]    | Purchase lifecycle      |
//! | `/v1/quotes/*`          | [`routes::quotes`]       | Quote lifecycle         |
//! | `/v1/profiles/*`        | [`routes::profiles`]     | Profiles & user admin   |
//! | `/v1/dashboard`         | [`routes::dashboard`]    | User dashboard          |
//! | `/v1/admin/dashboard`   | [`routes::dashboard`]    | Moderation dashboard    |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → AuthMiddleware → Handler
//! ```
//!
//! The auth middleware never rejects — it resolves the bearer token into an
//! [`auth::AuthState`] request extension and lets each handler's extractors
//! decide whether the request may proceed. Listing reads stay public that
//! way without a separate unauthenticated router.
//!
//! ## OpenAPI
//!
//! Auto-generated spec via utoipa derive macros at `/openapi.json`.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod gate;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware so
/// they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    // Body size limit: 2 MiB. Image batches are hex-encoded JSON, so this
    // bounds a single listing submission rather than individual files.
    let api = Router::new()
        .merge(routes::auth::router())
        .merge(routes::properties::router())
        .merge(routes::marketplace::router())
        .merge(routes::movers::router())
        .merge(routes::bookings::router())
        .merge(routes::purchases::router())
        .merge(routes::quotes::router())
        .merge(routes::profiles::router())
        .merge(routes::dashboard::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(from_fn_with_state(state.clone(), auth::auth_middleware))
        // The web client runs on a different origin; auth is bearer tokens,
        // never cookies.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks:
/// - In-memory stores are accessible (read lock acquirable).
/// - Database connection is healthy (when configured).
///
/// Returns 200 "ready" or 503 with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.profiles.len();
    let _ = state.properties.len();
    let _ = state.bookings.len();

    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
