//! Moving quote persistence operations, on the `mover_quotes` table.
//!
//! `quote_amount` is nullable and only ever set together with a move to
//! the `quoted` status.

use chrono::{DateTime, Utc};
use murima_core::{Email, Phone, QuoteId, ServiceId, UserId};
use murima_state::{Lifecycle, QuoteStatus, TransitionRecord};
use sqlx::PgPool;
use uuid::Uuid;

use super::{decode_err, encode_err};
use crate::state::QuoteRecord;

/// Insert a new quote request.
pub async fn insert(pool: &PgPool, quote: &QuoteRecord) -> Result<(), sqlx::Error> {
    let transition_log = serde_json::to_value(&quote.transition_log)
        .map_err(|e| encode_err("quote transition_log", e))?;

    sqlx::query(
        "INSERT INTO mover_quotes (id, service_id, user_id, client_name, client_email, client_phone,
         pickup_location, delivery_location, moving_date, inventory, quote_amount, status,
         transition_log, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(quote.id.as_uuid())
    .bind(quote.service_id.as_uuid())
    .bind(quote.user_id.as_uuid())
    .bind(&quote.client_name)
    .bind(quote.client_email.as_str())
    .bind(quote.client_phone.as_str())
    .bind(&quote.pickup_location)
    .bind(&quote.delivery_location)
    .bind(quote.moving_date)
    .bind(&quote.inventory)
    .bind(quote.quote_amount)
    .bind(quote.status.as_str())
    .bind(&transition_log)
    .bind(quote.created_at)
    .bind(quote.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mirror a status transition (and any stamped amount) already committed
/// in memory.
pub async fn update_status(pool: &PgPool, quote: &QuoteRecord) -> Result<bool, sqlx::Error> {
    let transition_log = serde_json::to_value(&quote.transition_log)
        .map_err(|e| encode_err("quote transition_log", e))?;

    let result = sqlx::query(
        "UPDATE mover_quotes SET status = $1, quote_amount = $2, transition_log = $3, updated_at = $4
         WHERE id = $5",
    )
    .bind(quote.status.as_str())
    .bind(quote.quote_amount)
    .bind(&transition_log)
    .bind(quote.updated_at)
    .bind(quote.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all quotes into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<QuoteRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, QuoteRow>(
        "SELECT id, service_id, user_id, client_name, client_email, client_phone, pickup_location,
         delivery_location, moving_date, inventory, quote_amount, status, transition_log,
         created_at, updated_at
         FROM mover_quotes ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(QuoteRow::into_record).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct QuoteRow {
    id: Uuid,
    service_id: Uuid,
    user_id: Uuid,
    client_name: String,
    client_email: String,
    client_phone: String,
    pickup_location: String,
    delivery_location: String,
    moving_date: chrono::NaiveDate,
    inventory: Option<String>,
    quote_amount: Option<i64>,
    status: String,
    transition_log: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuoteRow {
    fn into_record(self) -> Result<QuoteRecord, sqlx::Error> {
        let status = QuoteStatus::parse(&self.status).unwrap_or_else(|| {
            tracing::warn!(
                id = %self.id,
                status = %self.status,
                "unknown quote status in database, defaulting to pending"
            );
            QuoteStatus::Pending
        });
        let transition_log: Vec<TransitionRecord> =
            serde_json::from_value(self.transition_log).unwrap_or_else(|e| {
                tracing::warn!(
                    id = %self.id,
                    error = %e,
                    "failed to deserialize quote transition_log, defaulting to empty"
                );
                Vec::new()
            });
        let client_email =
            Email::new(self.client_email).map_err(|e| decode_err("quote client_email", e))?;
        let client_phone =
            Phone::new(self.client_phone).map_err(|e| decode_err("quote client_phone", e))?;

        Ok(QuoteRecord {
            id: QuoteId::from_uuid(self.id),
            service_id: ServiceId::from_uuid(self.service_id),
            user_id: UserId::from_uuid(self.user_id),
            client_name: self.client_name,
            client_email,
            client_phone,
            pickup_location: self.pickup_location,
            delivery_location: self.delivery_location,
            moving_date: self.moving_date,
            inventory: self.inventory,
            quote_amount: self.quote_amount,
            status,
            transition_log,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
