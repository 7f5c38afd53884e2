//! Moving-services directory entries.

use chrono::{DateTime, Utc};
use murima_core::{ServiceId, UserId, ValidationError};
use serde::{Deserialize, Serialize};

use crate::{require_images, require_text};

/// A mover company listed in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingService {
    pub id: ServiceId,
    pub name: String,
    pub location: String,
    /// Free-text price band shown on the card, e.g. "KSh 15,000 - 40,000".
    pub price_range: Option<String>,
    /// Offered service lines, e.g. "packing", "storage", "office moves".
    pub services: Vec<String>,
    pub rating: Option<f32>,
    /// Set by moderation, never at creation.
    pub verified: bool,
    /// Primary image URL — always equal to `images[0]`.
    pub image: String,
    pub images: Vec<String>,
    /// Owner identity. Immutable after creation.
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission fields for a new moving-service entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMovingService {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

impl MovingService {
    /// Validate and construct. New entries start unverified and unrated.
    /// At least one image is required; the first becomes the primary image.
    pub fn create(
        new: NewMovingService,
        created_by: UserId,
        images: Vec<String>,
    ) -> Result<Self, ValidationError> {
        require_images(&images)?;
        let name = require_text("name", &new.name, 255)?;
        let location = require_text("location", &new.location, 255)?;
        let price_range = match new.price_range.as_deref() {
            Some(range) if !range.trim().is_empty() => {
                Some(require_text("price_range", range, 100)?)
            }
            _ => None,
        };
        let services = new
            .services
            .into_iter()
            .map(|s| require_text("services", &s, 100))
            .collect::<Result<Vec<_>, _>>()?;
        let now = Utc::now();

        Ok(Self {
            id: ServiceId::new(),
            name,
            location,
            price_range,
            services,
            rating: None,
            verified: false,
            image: images[0].clone(),
            images,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_service() -> NewMovingService {
        NewMovingService {
            name: "Haraka Movers".to_string(),
            location: "Mombasa Road, Nairobi".to_string(),
            price_range: Some("KSh 15,000 - 40,000".to_string()),
            services: vec!["packing".to_string(), "storage".to_string()],
        }
    }

    fn one_image() -> Vec<String> {
        vec!["https://img.example/truck.jpg".to_string()]
    }

    #[test]
    fn create_starts_unverified() {
        let s = MovingService::create(new_service(), UserId::new(), one_image()).unwrap();
        assert!(!s.verified);
        assert!(s.rating.is_none());
        assert_eq!(s.services, vec!["packing", "storage"]);
    }

    #[test]
    fn blank_price_range_becomes_none() {
        let mut new = new_service();
        new.price_range = Some("   ".to_string());
        let s = MovingService::create(new, UserId::new(), one_image()).unwrap();
        assert!(s.price_range.is_none());
    }

    #[test]
    fn create_rejects_empty_image_list() {
        assert_eq!(
            MovingService::create(new_service(), UserId::new(), vec![]).unwrap_err(),
            ValidationError::NoImages
        );
    }

    #[test]
    fn empty_service_line_is_rejected() {
        let mut new = new_service();
        new.services.push("  ".to_string());
        assert_eq!(
            MovingService::create(new, UserId::new(), one_image()).unwrap_err(),
            ValidationError::Empty("services")
        );
    }
}
