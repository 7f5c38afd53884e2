//! Peer-to-peer marketplace items.

use chrono::{DateTime, Utc};
use murima_core::{ItemId, UserId, ValidationError};
use serde::{Deserialize, Serialize};

use crate::{require_amount, require_images, require_text};

/// Declared condition of a second-hand item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    New,
    LikeNew,
    Good,
    Fair,
}

impl ItemCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemCondition::New => "new",
            ItemCondition::LikeNew => "like_new",
            ItemCondition::Good => "good",
            ItemCondition::Fair => "fair",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(ItemCondition::New),
            "like_new" => Some(ItemCondition::LikeNew),
            "good" => Some(ItemCondition::Good),
            "fair" => Some(ItemCondition::Fair),
            _ => None,
        }
    }
}

/// A marketplace item row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceItem {
    pub id: ItemId,
    pub title: String,
    pub category: String,
    pub condition: ItemCondition,
    /// Price in whole shillings. Copied onto purchases at submission time.
    pub price: i64,
    pub location: String,
    /// Primary image URL — always equal to `images[0]`.
    pub image: String,
    pub images: Vec<String>,
    /// Seller identity. Immutable after creation.
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission fields for a new marketplace item.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMarketplaceItem {
    pub title: String,
    pub category: String,
    pub condition: ItemCondition,
    pub price: i64,
    pub location: String,
}

impl MarketplaceItem {
    /// Validate and construct. At least one image is required; the first
    /// becomes the primary image.
    pub fn create(
        new: NewMarketplaceItem,
        created_by: UserId,
        images: Vec<String>,
    ) -> Result<Self, ValidationError> {
        require_images(&images)?;
        let title = require_text("title", &new.title, 255)?;
        let category = require_text("category", &new.category, 100)?;
        let location = require_text("location", &new.location, 255)?;
        let price = require_amount("price", new.price)?;
        let now = Utc::now();

        Ok(Self {
            id: ItemId::new(),
            title,
            category,
            condition: new.condition,
            price,
            location,
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

    fn new_item() -> NewMarketplaceItem {
        NewMarketplaceItem {
            title: "Samsung 55\" TV".to_string(),
            category: "electronics".to_string(),
            condition: ItemCondition::LikeNew,
            price: 48_000,
            location: "Westlands, Nairobi".to_string(),
        }
    }

    #[test]
    fn create_sets_seller_and_primary_image() {
        let seller = UserId::new();
        let item = MarketplaceItem::create(
            new_item(),
            seller,
            vec!["https://img.example/tv.jpg".to_string()],
        )
        .unwrap();
        assert_eq!(item.created_by, seller);
        assert_eq!(item.image, "https://img.example/tv.jpg");
    }

    #[test]
    fn create_rejects_empty_category() {
        let mut new = new_item();
        new.category = String::new();
        assert_eq!(
            MarketplaceItem::create(new, UserId::new(), vec!["u".to_string()]).unwrap_err(),
            ValidationError::Empty("category")
        );
    }

    #[test]
    fn create_rejects_empty_image_list() {
        assert_eq!(
            MarketplaceItem::create(new_item(), UserId::new(), vec![]).unwrap_err(),
            ValidationError::NoImages
        );
    }

    #[test]
    fn condition_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&ItemCondition::LikeNew).unwrap(),
            "\"like_new\""
        );
        assert_eq!(ItemCondition::parse("like_new"), Some(ItemCondition::LikeNew));
        assert_eq!(ItemCondition::parse("mint"), None);
    }
}
