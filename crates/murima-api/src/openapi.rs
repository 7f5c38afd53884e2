//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Session token issued by POST /v1/auth/login, sent as \
                             `Authorization: Bearer <token>`.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Murima API — Property & Services Marketplace",
        version = "0.3.2",
        description = "REST API for the Murima marketplace.\n\nProvides:\n- **Property listings** across rentals, short stays, and office space, with conjunctive search filters\n- **Marketplace items** with free-text search and condition grading\n- **Moving services** directory with quote requests\n- **Bookings, purchases, and quotes** with admin-driven lifecycle transitions and an append-only transition log\n- **Auth** via salted-digest credentials and bearer session tokens\n- **Profiles** with self-service editing and admin role management\n- **Dashboards** for users (own transactions, joined with listing titles) and moderation staff (counts by status)\n\nListing reads are public. Everything that writes requires a session; lifecycle transitions and user management require the admin role, and moderation dashboards admit moderators as well. Health probes (`/health/*`) are unauthenticated.",
        license(name = "AGPL-3.0-or-later"),
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        // ── Auth ─────────────────────────────────────────────────────────
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        // ── Properties ───────────────────────────────────────────────────
        crate::routes::properties::create_property,
        crate::routes::properties::list_properties,
        crate::routes::properties::get_property,
        crate::routes::properties::delete_property,
        // ── Marketplace ──────────────────────────────────────────────────
        crate::routes::marketplace::create_item,
        crate::routes::marketplace::list_items,
        crate::routes::marketplace::get_item,
        crate::routes::marketplace::delete_item,
        // ── Movers ───────────────────────────────────────────────────────
        crate::routes::movers::create_mover,
        crate::routes::movers::list_movers,
        crate::routes::movers::get_mover,
        crate::routes::movers::delete_mover,
        // ── Bookings ─────────────────────────────────────────────────────
        crate::routes::bookings::create_booking,
        crate::routes::bookings::list_bookings,
        crate::routes::bookings::my_bookings,
        crate::routes::bookings::get_booking,
        crate::routes::bookings::transition_booking,
        // ── Purchases ────────────────────────────────────────────────────
        crate::routes::purchases::create_purchase,
        crate::routes::purchases::list_purchases,
        crate::routes::purchases::my_purchases,
        crate::routes::purchases::my_sales,
        crate::routes::purchases::transition_purchase,
        // ── Quotes ───────────────────────────────────────────────────────
        crate::routes::quotes::create_quote,
        crate::routes::quotes::list_quotes,
        crate::routes::quotes::my_quotes,
        crate::routes::quotes::transition_quote,
        // ── Profiles ─────────────────────────────────────────────────────
        crate::routes::profiles::my_profile,
        crate::routes::profiles::update_my_profile,
        crate::routes::profiles::list_profiles,
        crate::routes::profiles::change_role,
        crate::routes::profiles::set_verified,
        // ── Dashboards ───────────────────────────────────────────────────
        crate::routes::dashboard::user_dashboard,
        crate::routes::dashboard::admin_dashboard,
    ),
    components(
        schemas(
            // ── Error types ─────────────────────────────────────────────
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            // ── Transaction records ─────────────────────────────────────
            crate::state::BookingRecord,
            crate::state::PurchaseRecord,
            crate::state::QuoteRecord,
            // ── Shared DTOs ─────────────────────────────────────────────
            crate::routes::ImageFile,
            // ── Auth DTOs ───────────────────────────────────────────────
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::AuthResponse,
            // ── Listing DTOs ────────────────────────────────────────────
            crate::routes::properties::CreatePropertyRequest,
            crate::routes::marketplace::CreateItemRequest,
            crate::routes::movers::CreateMoverRequest,
            // ── Transaction DTOs ────────────────────────────────────────
            crate::routes::bookings::CreateBookingRequest,
            crate::routes::bookings::TransitionBookingRequest,
            crate::routes::purchases::CreatePurchaseRequest,
            crate::routes::purchases::TransitionPurchaseRequest,
            crate::routes::quotes::CreateQuoteRequest,
            crate::routes::quotes::TransitionQuoteRequest,
            // ── Profile DTOs ────────────────────────────────────────────
            crate::routes::profiles::UpdateProfileRequest,
            crate::routes::profiles::ChangeRoleRequest,
            crate::routes::profiles::SetVerifiedRequest,
            // ── Dashboard DTOs ──────────────────────────────────────────
            crate::routes::dashboard::UserDashboard,
            crate::routes::dashboard::BookingOverview,
            crate::routes::dashboard::PurchaseOverview,
            crate::routes::dashboard::QuoteOverview,
            crate::routes::dashboard::AdminDashboard,
            crate::routes::dashboard::OrderStatusCounts,
            crate::routes::dashboard::QuoteStatusCounts,
            crate::routes::dashboard::ListingTotals,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login, logout, and session introspection"),
        (name = "properties", description = "Property listings — rentals, short stays, and office space"),
        (name = "marketplace", description = "Peer-to-peer marketplace items"),
        (name = "movers", description = "Moving services directory"),
        (name = "bookings", description = "Property bookings and their lifecycle"),
        (name = "purchases", description = "Marketplace purchases and their lifecycle"),
        (name = "quotes", description = "Moving quote requests and their lifecycle"),
        (name = "profiles", description = "Profile self-service and admin user management"),
        (name = "dashboard", description = "User and moderation dashboards"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_generates_successfully() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Murima API — Property & Services Marketplace");
        assert_eq!(spec.info.version, "0.3.2");
    }

    #[test]
    fn spec_has_listing_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/v1/properties"));
        assert!(spec.paths.paths.contains_key("/v1/properties/{id}"));
        assert!(spec.paths.paths.contains_key("/v1/marketplace/items"));
        assert!(spec.paths.paths.contains_key("/v1/movers"));
    }

    #[test]
    fn spec_has_transaction_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/v1/bookings"));
        assert!(spec.paths.paths.contains_key("/v1/bookings/{id}/transition"));
        assert!(spec.paths.paths.contains_key("/v1/purchases/{id}/transition"));
        assert!(spec.paths.paths.contains_key("/v1/quotes/{id}/transition"));
    }

    #[test]
    fn spec_has_auth_and_profile_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/v1/auth/register"));
        assert!(spec.paths.paths.contains_key("/v1/auth/login"));
        assert!(spec.paths.paths.contains_key("/v1/profiles/{id}/role"));
        assert!(spec.paths.paths.contains_key("/v1/admin/dashboard"));
    }

    #[test]
    fn spec_has_security_scheme() {
        let spec = ApiDoc::openapi();
        let components = spec.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn spec_has_schemas() {
        let spec = ApiDoc::openapi();
        let schemas = &spec.components.as_ref().unwrap().schemas;
        for name in &[
            "ErrorBody",
            "BookingRecord",
            "QuoteRecord",
            "CreatePropertyRequest",
            "TransitionQuoteRequest",
            "AdminDashboard",
        ] {
            assert!(schemas.contains_key(*name), "should contain {name} schema");
        }
    }

    #[test]
    fn spec_serializes_to_json() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("bearer_auth"));
    }

    #[test]
    fn router_builds_successfully() {
        let _router = router();
    }
}
