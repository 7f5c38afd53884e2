//! # Dashboards
//!
//! Two read-only aggregate views. The user dashboard joins the caller's
//! transactions with the listing titles they reference so a client can
//! render them without extra round-trips. The admin dashboard reports
//! counts by status and is readable by moderators as well as admins.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use murima_state::{OrderStatus, QuoteStatus};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AuthState, CallerIdentity};
use crate::error::AppError;
use crate::gate::{require, Requirement};
use crate::state::{AppState, BookingRecord, PurchaseRecord, QuoteRecord};

/// A booking joined with the title of the property it is for. The title
/// is `None` when the property has since been deleted.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingOverview {
    pub property_title: Option<String>,
    pub booking: BookingRecord,
}

/// A purchase joined with the title of the item it is for.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseOverview {
    pub item_title: Option<String>,
    pub purchase: PurchaseRecord,
}

/// A quote joined with the name of the moving service it is for.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteOverview {
    pub service_name: Option<String>,
    pub quote: QuoteRecord,
}

/// Everything the caller has in flight, newest first within each section.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDashboard {
    /// Bookings the caller made.
    pub bookings: Vec<BookingOverview>,
    /// Purchases where the caller is the buyer.
    pub purchases: Vec<PurchaseOverview>,
    /// Purchases where the caller is the seller.
    pub sales: Vec<PurchaseOverview>,
    /// Moving quotes the caller requested.
    pub quotes: Vec<QuoteOverview>,
}

/// Counts by order status for one transaction collection.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct OrderStatusCounts {
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total: usize,
}

impl OrderStatusCounts {
    fn tally(statuses: impl Iterator<Item = OrderStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                OrderStatus::Pending => counts.pending += 1,
                OrderStatus::Confirmed => counts.confirmed += 1,
                OrderStatus::Completed => counts.completed += 1,
                OrderStatus::Cancelled => counts.cancelled += 1,
            }
            counts.total += 1;
        }
        counts
    }
}

/// Counts by quote status.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct QuoteStatusCounts {
    pub pending: usize,
    pub confirmed: usize,
    pub quoted: usize,
    pub cancelled: usize,
    pub total: usize,
}

impl QuoteStatusCounts {
    fn tally(statuses: impl Iterator<Item = QuoteStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                QuoteStatus::Pending => counts.pending += 1,
                QuoteStatus::Confirmed => counts.confirmed += 1,
                QuoteStatus::Quoted => counts.quoted += 1,
                QuoteStatus::Cancelled => counts.cancelled += 1,
            }
            counts.total += 1;
        }
        counts
    }
}

/// Listing totals across the platform.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingTotals {
    pub properties: usize,
    pub marketplace_items: usize,
    pub moving_services: usize,
    pub profiles: usize,
}

/// The moderation dashboard payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub bookings: OrderStatusCounts,
    pub purchases: OrderStatusCounts,
    pub quotes: QuoteStatusCounts,
    pub totals: ListingTotals,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/dashboard", get(user_dashboard))
        .route("/v1/admin/dashboard", get(admin_dashboard))
}

/// GET /v1/dashboard — The caller's transactions with joined listing titles.
#[utoipa::path(
    get,
    path = "/v1/dashboard",
    responses(
        (status = 200, description = "Own dashboard", body = UserDashboard),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
    ),
    tag = "dashboard"
)]
async fn user_dashboard(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<UserDashboard> {
    let mut bookings: Vec<BookingOverview> = state
        .bookings
        .list()
        .into_iter()
        .filter(|b| b.user_id == caller.user_id)
        .map(|booking| BookingOverview {
            property_title: state.properties.get(&booking.property_id).map(|p| p.title),
            booking,
        })
        .collect();
    bookings.sort_by_key(|b| std::cmp::Reverse(b.booking.created_at));

    let all_purchases = state.purchases.list();
    let mut purchases: Vec<PurchaseOverview> = all_purchases
        .iter()
        .filter(|p| p.buyer_id == caller.user_id)
        .cloned()
        .map(|purchase| PurchaseOverview {
            item_title: state.items.get(&purchase.item_id).map(|i| i.title),
            purchase,
        })
        .collect();
    purchases.sort_by_key(|p| std::cmp::Reverse(p.purchase.created_at));

    let mut sales: Vec<PurchaseOverview> = all_purchases
        .iter()
        .filter(|p| p.seller_id == caller.user_id)
        .cloned()
        .map(|purchase| PurchaseOverview {
            item_title: state.items.get(&purchase.item_id).map(|i| i.title),
            purchase,
        })
        .collect();
    sales.sort_by_key(|p| std::cmp::Reverse(p.purchase.created_at));

    let mut quotes: Vec<QuoteOverview> = state
        .quotes
        .list()
        .into_iter()
        .filter(|q| q.user_id == caller.user_id)
        .map(|quote| QuoteOverview {
            service_name: state.services.get(&quote.service_id).map(|s| s.name),
            quote,
        })
        .collect();
    quotes.sort_by_key(|q| std::cmp::Reverse(q.quote.created_at));

    Json(UserDashboard {
        bookings,
        purchases,
        sales,
        quotes,
    })
}

/// GET /v1/admin/dashboard — Platform-wide counts. Admin or moderator.
#[utoipa::path(
    get,
    path = "/v1/admin/dashboard",
    responses(
        (status = 200, description = "Moderation dashboard", body = AdminDashboard),
        (status = 403, description = "Requires admin or moderator role", body = crate::error::ErrorBody),
    ),
    tag = "dashboard"
)]
async fn admin_dashboard(
    State(state): State<AppState>,
    auth: AuthState,
) -> Result<Json<AdminDashboard>, AppError> {
    require(&auth, Requirement::AdminOrModerator, "/v1/admin/dashboard")?;
    Ok(Json(AdminDashboard {
        bookings: OrderStatusCounts::tally(state.bookings.list().into_iter().map(|b| b.status)),
        purchases: OrderStatusCounts::tally(state.purchases.list().into_iter().map(|p| p.status)),
        quotes: QuoteStatusCounts::tally(state.quotes.list().into_iter().map(|q| q.status)),
        totals: ListingTotals {
            properties: state.properties.len(),
            marketplace_items: state.items.len(),
            moving_services: state.services.len(),
            profiles: state.profiles.len(),
        },
    }))
}
