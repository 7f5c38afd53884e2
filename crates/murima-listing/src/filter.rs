//! Conjunctive search filters over the listing collections.
//!
//! A filter is a set of optional criteria; every supplied criterion must
//! hold for a row to match (pure AND, no OR across criteria). Filters
//! deserialize straight from query strings and evaluate against the
//! in-memory stores, which are the source of truth at runtime.

use serde::Deserialize;

use crate::{ItemCondition, MarketplaceItem, Property, PropertyKind};

/// Case-insensitive substring match.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Search criteria for property listings. All fields optional; empty
/// filter matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyFilter {
    /// Substring match on location, case-insensitive.
    #[serde(default)]
    pub location: Option<String>,
    /// Exact vertical match.
    #[serde(default)]
    pub kind: Option<PropertyKind>,
    /// Inclusive lower price bound.
    #[serde(default)]
    pub price_min: Option<i64>,
    /// Inclusive upper price bound.
    #[serde(default)]
    pub price_max: Option<i64>,
    /// Minimum bedroom count.
    #[serde(default)]
    pub bedrooms: Option<u32>,
    /// Minimum bathroom count.
    #[serde(default)]
    pub bathrooms: Option<u32>,
}

impl PropertyFilter {
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.kind.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.bedrooms.is_none()
            && self.bathrooms.is_none()
    }

    /// Whether `property` satisfies every supplied criterion.
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(location) = &self.location {
            if !contains_ci(&property.location, location) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if property.kind != kind {
                return false;
            }
        }
        if let Some(min) = self.price_min {
            if property.price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if property.price > max {
                return false;
            }
        }
        if let Some(bedrooms) = self.bedrooms {
            if property.bedrooms.unwrap_or(0) < bedrooms {
                return false;
            }
        }
        if let Some(bathrooms) = self.bathrooms {
            if property.bathrooms.unwrap_or(0) < bathrooms {
                return false;
            }
        }
        true
    }
}

/// Search criteria for marketplace items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketplaceFilter {
    /// Free text matched against title or location, case-insensitive.
    #[serde(default)]
    pub query: Option<String>,
    /// Exact category match.
    #[serde(default)]
    pub category: Option<String>,
    /// Exact condition match.
    #[serde(default)]
    pub condition: Option<ItemCondition>,
    /// Inclusive upper price bound.
    #[serde(default)]
    pub price_max: Option<i64>,
}

impl MarketplaceFilter {
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.category.is_none()
            && self.condition.is_none()
            && self.price_max.is_none()
    }

    /// Whether `item` satisfies every supplied criterion. The free-text
    /// query matches if *either* title or location contains it.
    pub fn matches(&self, item: &MarketplaceItem) -> bool {
        if let Some(query) = &self.query {
            if !contains_ci(&item.title, query) && !contains_ci(&item.location, query) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !item.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(condition) = self.condition {
            if item.condition != condition {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if item.price > max {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewMarketplaceItem, NewProperty, PriceType};
    use murima_core::UserId;

    fn property(location: &str, price: i64, bedrooms: Option<u32>) -> Property {
        Property::create(
            NewProperty {
                title: "Test listing".to_string(),
                kind: PropertyKind::Rental,
                location: location.to_string(),
                price,
                price_type: PriceType::PerMonth,
                bedrooms,
                bathrooms: Some(1),
                area_sqm: None,
            },
            UserId::new(),
            vec!["https://img.example/p.jpg".to_string()],
        )
        .unwrap()
    }

    fn item(title: &str, location: &str, price: i64) -> MarketplaceItem {
        MarketplaceItem::create(
            NewMarketplaceItem {
                title: title.to_string(),
                category: "furniture".to_string(),
                condition: ItemCondition::Good,
                price,
                location: location.to_string(),
            },
            UserId::new(),
            vec!["https://img.example/i.jpg".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = PropertyFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&property("Kilimani", 65_000, Some(2))));
    }

    #[test]
    fn location_is_case_insensitive_substring() {
        let filter = PropertyFilter {
            location: Some("kilimani".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&property("Kilimani, Nairobi", 65_000, Some(2))));
        assert!(!filter.matches(&property("Westlands", 65_000, Some(2))));
    }

    #[test]
    fn criteria_are_conjunctive() {
        let filter = PropertyFilter {
            location: Some("Nairobi".to_string()),
            price_max: Some(50_000),
            ..Default::default()
        };
        // Location matches but price exceeds the bound.
        assert!(!filter.matches(&property("Kilimani, Nairobi", 65_000, Some(2))));
        assert!(filter.matches(&property("Kilimani, Nairobi", 45_000, Some(2))));
    }

    #[test]
    fn bedroom_minimum_treats_missing_as_zero() {
        let filter = PropertyFilter {
            bedrooms: Some(2),
            ..Default::default()
        };
        assert!(!filter.matches(&property("Nairobi", 10_000, None)));
        assert!(filter.matches(&property("Nairobi", 10_000, Some(3))));
    }

    #[test]
    fn free_text_matches_title_or_location() {
        let filter = MarketplaceFilter {
            query: Some("table".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&item("Dining Table", "Nairobi", 24_000)));
        assert!(filter.matches(&item("Six chairs", "Table Mesa Estate", 24_000)));
        assert!(!filter.matches(&item("Six chairs", "Nairobi", 24_000)));
    }

    #[test]
    fn category_match_is_exact_but_case_insensitive() {
        let filter = MarketplaceFilter {
            category: Some("Furniture".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&item("Dining Table", "Nairobi", 24_000)));

        let miss = MarketplaceFilter {
            category: Some("electronics".to_string()),
            ..Default::default()
        };
        assert!(!miss.matches(&item("Dining Table", "Nairobi", 24_000)));
    }
}
