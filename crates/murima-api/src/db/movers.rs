//! Moving service persistence operations, on the `moving_services` table.
//!
//! The service lines are stored as a `TEXT[]` column like listing images.

use chrono::{DateTime, Utc};
use murima_core::{ServiceId, UserId};
use murima_listing::MovingService;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a new moving service.
pub async fn insert(pool: &PgPool, service: &MovingService) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO moving_services (id, name, location, price_range, services, rating, verified,
         image, images, created_by, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(service.id.as_uuid())
    .bind(&service.name)
    .bind(&service.location)
    .bind(&service.price_range)
    .bind(&service.services)
    .bind(service.rating)
    .bind(service.verified)
    .bind(&service.image)
    .bind(&service.images)
    .bind(service.created_by.as_uuid())
    .bind(service.created_at)
    .bind(service.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Hard-delete a moving service.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM moving_services WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all services into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<MovingService>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ServiceRow>(
        "SELECT id, name, location, price_range, services, rating, verified, image, images,
         created_by, created_at, updated_at
         FROM moving_services ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ServiceRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    name: String,
    location: String,
    price_range: Option<String>,
    services: Vec<String>,
    rating: Option<f32>,
    verified: bool,
    image: String,
    images: Vec<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn into_record(self) -> MovingService {
        MovingService {
            id: ServiceId::from_uuid(self.id),
            name: self.name,
            location: self.location,
            price_range: self.price_range,
            services: self.services,
            rating: self.rating,
            verified: self.verified,
            image: self.image,
            images: self.images,
            created_by: UserId::from_uuid(self.created_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
