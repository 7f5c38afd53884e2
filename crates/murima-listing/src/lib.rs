//! # murima-listing — Listing Entities and Search Filters
//!
//! The three listing collections of the platform:
//!
//! - **Properties** ([`property`]): rentals, stays, and office space.
//! - **Marketplace items** ([`marketplace`]): peer-to-peer household goods.
//! - **Moving services** ([`moving`]): the movers directory.
//!
//! All variants share the creation contract, enforced inside each variant
//! constructor: a `created_by` owner that is immutable after creation, and
//! an ordered image list with at least one entry whose first element is
//! the primary image. [`Listing`] is the tagged union over the variants
//! for callers that handle any listing generically, and [`NewListing`] is
//! its creation input; both delegate to the variant constructors.
//!
//! [`filter`] holds the pure search filter builder: conjunctive filters
//! that deserialize from query strings and evaluate in memory.

pub mod filter;
pub mod marketplace;
pub mod moving;
pub mod property;

use chrono::{DateTime, Utc};
use murima_core::{UserId, ValidationError};
use serde::{Deserialize, Serialize};

pub use filter::{MarketplaceFilter, PropertyFilter};
pub use marketplace::{ItemCondition, MarketplaceItem, NewMarketplaceItem};
pub use moving::{MovingService, NewMovingService};
pub use property::{NewProperty, PriceType, Property, PropertyKind};

/// Require a non-empty, bounded text field. Returns the trimmed value.
pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if trimmed.len() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

/// Require at least one image URL. The first entry is the primary image.
pub(crate) fn require_images(images: &[String]) -> Result<(), ValidationError> {
    if images.is_empty() {
        return Err(ValidationError::NoImages);
    }
    Ok(())
}

/// Require a non-negative amount.
pub(crate) fn require_amount(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value < 0 {
        return Err(ValidationError::InvalidAmount { field, value });
    }
    Ok(value)
}

/// A listing of any variant — the tagged union over the three collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "listing_kind", rename_all = "snake_case")]
pub enum Listing {
    Property(Property),
    MarketplaceItem(MarketplaceItem),
    MovingService(MovingService),
}

/// Creation input for any listing variant. One code path validates and
/// constructs all three, parameterized by the variant's own fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "listing_kind", rename_all = "snake_case")]
pub enum NewListing {
    Property(NewProperty),
    MarketplaceItem(NewMarketplaceItem),
    MovingService(NewMovingService),
}

impl Listing {
    /// Validate and construct a listing of the requested variant.
    ///
    /// `images` are the public URLs produced by the media store, in
    /// submission order; the first becomes the primary image. The owner is
    /// fixed at creation and never changes afterwards.
    pub fn create(
        new: NewListing,
        created_by: UserId,
        images: Vec<String>,
    ) -> Result<Self, ValidationError> {
        match new {
            NewListing::Property(p) => Property::create(p, created_by, images).map(Self::Property),
            NewListing::MarketplaceItem(m) => {
                MarketplaceItem::create(m, created_by, images).map(Self::MarketplaceItem)
            }
            NewListing::MovingService(s) => {
                MovingService::create(s, created_by, images).map(Self::MovingService)
            }
        }
    }

    /// The owner identity, immutable after creation.
    pub fn created_by(&self) -> UserId {
        match self {
            Listing::Property(p) => p.created_by,
            Listing::MarketplaceItem(m) => m.created_by,
            Listing::MovingService(s) => s.created_by,
        }
    }

    /// The primary image URL (first of the ordered image list).
    pub fn primary_image(&self) -> &str {
        match self {
            Listing::Property(p) => &p.image,
            Listing::MarketplaceItem(m) => &m.image,
            Listing::MovingService(s) => &s.image,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Listing::Property(p) => p.created_at,
            Listing::MarketplaceItem(m) => m.created_at,
            Listing::MovingService(s) => s.created_at,
        }
    }
}
