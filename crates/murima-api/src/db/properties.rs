//! Property persistence operations, on the `properties` table.
//!
//! Kind and price type are stored as lowercase strings; images as a
//! `TEXT[]` column in submission order.

use chrono::{DateTime, Utc};
use murima_core::{PropertyId, UserId};
use murima_listing::{PriceType, Property, PropertyKind};
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_err;

/// Insert a new property listing.
pub async fn insert(pool: &PgPool, property: &Property) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO properties (id, title, kind, location, price, price_type, bedrooms, bathrooms,
         area_sqm, image, images, featured, rating, created_by, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(property.id.as_uuid())
    .bind(&property.title)
    .bind(property.kind.as_str())
    .bind(&property.location)
    .bind(property.price)
    .bind(property.price_type.as_str())
    .bind(property.bedrooms.map(|v| v as i32))
    .bind(property.bathrooms.map(|v| v as i32))
    .bind(property.area_sqm.map(|v| v as i32))
    .bind(&property.image)
    .bind(&property.images)
    .bind(property.featured)
    .bind(property.rating)
    .bind(property.created_by.as_uuid())
    .bind(property.created_at)
    .bind(property.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Hard-delete a property listing.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all properties into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Property>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PropertyRow>(
        "SELECT id, title, kind, location, price, price_type, bedrooms, bathrooms, area_sqm,
         image, images, featured, rating, created_by, created_at, updated_at
         FROM properties ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(PropertyRow::into_record).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PropertyRow {
    id: Uuid,
    title: String,
    kind: String,
    location: String,
    price: i64,
    price_type: String,
    bedrooms: Option<i32>,
    bathrooms: Option<i32>,
    area_sqm: Option<i32>,
    image: String,
    images: Vec<String>,
    featured: bool,
    rating: Option<f32>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PropertyRow {
    fn into_record(self) -> Result<Property, sqlx::Error> {
        let kind = PropertyKind::parse(&self.kind)
            .ok_or_else(|| decode_err("property kind", &self.kind))?;
        let price_type = PriceType::parse(&self.price_type)
            .ok_or_else(|| decode_err("property price_type", &self.price_type))?;

        Ok(Property {
            id: PropertyId::from_uuid(self.id),
            title: self.title,
            kind,
            location: self.location,
            price: self.price,
            price_type,
            bedrooms: self.bedrooms.map(|v| v as u32),
            bathrooms: self.bathrooms.map(|v| v as u32),
            area_sqm: self.area_sqm.map(|v| v as u32),
            image: self.image,
            images: self.images,
            featured: self.featured,
            rating: self.rating,
            created_by: UserId::from_uuid(self.created_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
