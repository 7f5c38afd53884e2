//! Marketplace item persistence operations, on the `marketplace_items` table.

use chrono::{DateTime, Utc};
use murima_core::{ItemId, UserId};
use murima_listing::{ItemCondition, MarketplaceItem};
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_err;

/// Insert a new marketplace item.
pub async fn insert(pool: &PgPool, item: &MarketplaceItem) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO marketplace_items (id, title, category, condition, price, location, image,
         images, created_by, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(item.id.as_uuid())
    .bind(&item.title)
    .bind(&item.category)
    .bind(item.condition.as_str())
    .bind(item.price)
    .bind(&item.location)
    .bind(&item.image)
    .bind(&item.images)
    .bind(item.created_by.as_uuid())
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Hard-delete a marketplace item.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM marketplace_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all items into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<MarketplaceItem>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ItemRow>(
        "SELECT id, title, category, condition, price, location, image, images, created_by,
         created_at, updated_at
         FROM marketplace_items ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ItemRow::into_record).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    title: String,
    category: String,
    condition: String,
    price: i64,
    location: String,
    image: String,
    images: Vec<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ItemRow {
    fn into_record(self) -> Result<MarketplaceItem, sqlx::Error> {
        let condition = ItemCondition::parse(&self.condition)
            .ok_or_else(|| decode_err("item condition", &self.condition))?;

        Ok(MarketplaceItem {
            id: ItemId::from_uuid(self.id),
            title: self.title,
            category: self.category,
            condition,
            price: self.price,
            location: self.location,
            image: self.image,
            images: self.images,
            created_by: UserId::from_uuid(self.created_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
