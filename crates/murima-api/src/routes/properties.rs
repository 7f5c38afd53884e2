//! # Property Listings API
//!
//! Create, search, fetch, and delete property listings across the three
//! verticals (rental, airbnb, office). Creation takes the listing fields
//! plus the image batch; images are stored first, all-or-nothing, and the
//! record is only created once every image URL exists.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use murima_core::Role;
use murima_listing::{NewProperty, PriceType, Property, PropertyFilter, PropertyKind};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::{store_images, validate_image_batch, ImageFile, PaginationParams};
use crate::state::AppState;

/// Request to create a property listing.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePropertyRequest {
    pub title: String,
    /// Vertical: `rental`, `airbnb`, or `office`.
    pub property_type: String,
    pub location: String,
    /// Price in whole shillings.
    pub price: i64,
    /// `per_month` or `per_night`.
    pub price_type: String,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub area_sqm: Option<u32>,
    /// Image batch, at least one; the first becomes the primary image.
    pub images: Vec<ImageFile>,
}

impl Validate for CreatePropertyRequest {
    fn validate(&self) -> Result<(), String> {
        if PropertyKind::parse(&self.property_type).is_none() {
            return Err(format!(
                "invalid property_type '{}'. Valid types: rental, airbnb, office",
                self.property_type
            ));
        }
        if PriceType::parse(&self.price_type).is_none() {
            return Err(format!(
                "invalid price_type '{}'. Valid types: per_month, per_night",
                self.price_type
            ));
        }
        validate_image_batch(&self.images)
    }
}

/// Build the properties router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/properties",
            get(list_properties).post(create_property),
        )
        .route(
            "/v1/properties/{id}",
            get(get_property).delete(delete_property),
        )
}

/// POST /v1/properties — Create a property listing.
#[utoipa::path(
    post,
    path = "/v1/properties",
    request_body = CreatePropertyRequest,
    responses(
        (status = 201, description = "Listing created", body = Object),
        (status = 401, description = "Not signed in", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request or image upload failed", body = crate::error::ErrorBody),
    ),
    tag = "properties"
)]
async fn create_property(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreatePropertyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Property>), AppError> {
    let req = extract_validated_json(body)?;
    // Validated above; parse cannot fail here.
    let kind = PropertyKind::parse(&req.property_type)
        .ok_or_else(|| AppError::Validation("invalid property_type".to_string()))?;
    let price_type = PriceType::parse(&req.price_type)
        .ok_or_else(|| AppError::Validation("invalid price_type".to_string()))?;

    // Store images before creating the record so a failed upload leaves no
    // half-created listing behind.
    let urls = store_images(&state, caller.user_id, "properties", &req.images).await?;

    let property = Property::create(
        NewProperty {
            title: req.title,
            kind,
            location: req.location,
            price: req.price,
            price_type,
            bedrooms: req.bedrooms,
            bathrooms: req.bathrooms,
            area_sqm: req.area_sqm,
        },
        caller.user_id,
        urls,
    )?;

    state.properties.insert(property.id, property.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::properties::insert(pool, &property).await {
            tracing::error!(property_id = %property.id, error = %e, "failed to persist property");
            return Err(AppError::Internal(
                "listing recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok((StatusCode::CREATED, Json(property)))
}

/// GET /v1/properties — Search property listings.
///
/// All filter criteria are optional and conjunctive. Results are newest
/// first, paginated via `?limit=N&offset=M`.
#[utoipa::path(
    get,
    path = "/v1/properties",
    params(
        ("location" = Option<String>, Query, description = "Substring match, case-insensitive"),
        ("kind" = Option<String>, Query, description = "rental | airbnb | office"),
        ("price_min" = Option<i64>, Query, description = "Inclusive lower price bound"),
        ("price_max" = Option<i64>, Query, description = "Inclusive upper price bound"),
        ("bedrooms" = Option<u32>, Query, description = "Minimum bedrooms"),
        ("bathrooms" = Option<u32>, Query, description = "Minimum bathrooms"),
        ("limit" = Option<usize>, Query, description = "Max items (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Items to skip"),
    ),
    responses(
        (status = 200, description = "Matching listings", body = Vec<Object>),
    ),
    tag = "properties"
)]
async fn list_properties(
    State(state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
    Query(pagination): Query<PaginationParams>,
) -> Json<Vec<Property>> {
    let mut all: Vec<Property> = state
        .properties
        .list()
        .into_iter()
        .filter(|p| filter.matches(p))
        .collect();
    all.sort_by_key(|p| std::cmp::Reverse(p.created_at));
    let offset = pagination.effective_offset().min(all.len());
    let page = all
        .into_iter()
        .skip(offset)
        .take(pagination.effective_limit())
        .collect();
    Json(page)
}

/// GET /v1/properties/{id} — Fetch a property listing.
#[utoipa::path(
    get,
    path = "/v1/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Listing found", body = Object),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "properties"
)]
async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Property>, AppError> {
    state
        .properties
        .get(&id.into())
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("property {id} not found")))
}

/// DELETE /v1/properties/{id} — Hard-delete a listing. Admin only.
#[utoipa::path(
    delete,
    path = "/v1/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 403, description = "Requires admin role", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "properties"
)]
async fn delete_property(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Admin)?;
    state
        .properties
        .remove(&id.into())
        .ok_or_else(|| AppError::NotFound(format!("property {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::properties::delete(pool, id).await {
            tracing::error!(property_id = %id, error = %e, "failed to delete property from database");
            return Err(AppError::Internal(
                "listing removed in-memory but database delete failed".to_string(),
            ));
        }
    }

    tracing::info!(property_id = %id, admin = %caller.user_id, "property deleted");
    Ok(StatusCode::NO_CONTENT)
}
