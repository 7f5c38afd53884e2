//! Property listings: long-term rentals, short stays, and office space.

use chrono::{DateTime, Utc};
use murima_core::{PropertyId, UserId, ValidationError};
use serde::{Deserialize, Serialize};

use crate::{require_amount, require_images, require_text};

/// The property vertical a listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// Long-term house/apartment rental.
    Rental,
    /// Short-stay accommodation.
    Airbnb,
    /// Office space.
    Office,
}

impl PropertyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKind::Rental => "rental",
            PropertyKind::Airbnb => "airbnb",
            PropertyKind::Office => "office",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rental" => Some(PropertyKind::Rental),
            "airbnb" => Some(PropertyKind::Airbnb),
            "office" => Some(PropertyKind::Office),
            _ => None,
        }
    }
}

/// How the listed price is denominated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    PerMonth,
    PerNight,
}

impl PriceType {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceType::PerMonth => "per_month",
            PriceType::PerNight => "per_night",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "per_month" => Some(PriceType::PerMonth),
            "per_night" => Some(PriceType::PerNight),
            _ => None,
        }
    }
}

/// A property listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub kind: PropertyKind,
    pub location: String,
    /// Price in whole shillings.
    pub price: i64,
    pub price_type: PriceType,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    /// Floor area in square metres.
    pub area_sqm: Option<u32>,
    /// Primary image URL — always equal to `images[0]`.
    pub image: String,
    /// Ordered public image URLs, submission order.
    pub images: Vec<String>,
    pub featured: bool,
    pub rating: Option<f32>,
    /// Owner identity. Immutable after creation.
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission fields for a new property listing.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProperty {
    pub title: String,
    pub kind: PropertyKind,
    pub location: String,
    pub price: i64,
    pub price_type: PriceType,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub area_sqm: Option<u32>,
}

impl Property {
    /// Validate and construct. The caller supplies uploaded image URLs;
    /// at least one is required and the first becomes the primary image.
    pub fn create(
        new: NewProperty,
        created_by: UserId,
        images: Vec<String>,
    ) -> Result<Self, ValidationError> {
        require_images(&images)?;
        let title = require_text("title", &new.title, 255)?;
        let location = require_text("location", &new.location, 255)?;
        let price = require_amount("price", new.price)?;
        let now = Utc::now();

        Ok(Self {
            id: PropertyId::new(),
            title,
            kind: new.kind,
            location,
            price,
            price_type: new.price_type,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            area_sqm: new.area_sqm,
            image: images[0].clone(),
            images,
            featured: false,
            rating: None,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }
}
