//! Booking persistence operations, on the `bookings` table.
//!
//! Status is stored as its lowercase string form and the transition log
//! as a JSONB column. Transition legality is enforced at the application
//! layer, not in SQL.

use chrono::{DateTime, Utc};
use murima_core::{BookingId, Email, Phone, PropertyId, UserId};
use murima_state::{Lifecycle, OrderStatus, TransitionRecord};
use sqlx::PgPool;
use uuid::Uuid;

use super::{decode_err, encode_err};
use crate::state::BookingRecord;

/// Insert a new booking.
pub async fn insert(pool: &PgPool, booking: &BookingRecord) -> Result<(), sqlx::Error> {
    let transition_log = serde_json::to_value(&booking.transition_log)
        .map_err(|e| encode_err("booking transition_log", e))?;

    sqlx::query(
        "INSERT INTO bookings (id, property_id, user_id, guest_name, guest_email, guest_phone,
         check_in_date, check_out_date, status, transition_log, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(booking.id.as_uuid())
    .bind(booking.property_id.as_uuid())
    .bind(booking.user_id.as_uuid())
    .bind(&booking.guest_name)
    .bind(booking.guest_email.as_str())
    .bind(booking.guest_phone.as_str())
    .bind(booking.check_in_date)
    .bind(booking.check_out_date)
    .bind(booking.status.as_str())
    .bind(&transition_log)
    .bind(booking.created_at)
    .bind(booking.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mirror a status transition already committed in memory.
pub async fn update_status(pool: &PgPool, booking: &BookingRecord) -> Result<bool, sqlx::Error> {
    let transition_log = serde_json::to_value(&booking.transition_log)
        .map_err(|e| encode_err("booking transition_log", e))?;

    let result = sqlx::query(
        "UPDATE bookings SET status = $1, transition_log = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(booking.status.as_str())
    .bind(&transition_log)
    .bind(booking.updated_at)
    .bind(booking.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all bookings into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<BookingRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, BookingRow>(
        "SELECT id, property_id, user_id, guest_name, guest_email, guest_phone, check_in_date,
         check_out_date, status, transition_log, created_at, updated_at
         FROM bookings ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(BookingRow::into_record).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    property_id: Uuid,
    user_id: Uuid,
    guest_name: String,
    guest_email: String,
    guest_phone: String,
    check_in_date: chrono::NaiveDate,
    check_out_date: chrono::NaiveDate,
    status: String,
    transition_log: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_record(self) -> Result<BookingRecord, sqlx::Error> {
        let status = OrderStatus::parse(&self.status).unwrap_or_else(|| {
            tracing::warn!(
                id = %self.id,
                status = %self.status,
                "unknown booking status in database, defaulting to pending"
            );
            OrderStatus::Pending
        });
        let transition_log: Vec<TransitionRecord> =
            serde_json::from_value(self.transition_log).unwrap_or_else(|e| {
                tracing::warn!(
                    id = %self.id,
                    error = %e,
                    "failed to deserialize booking transition_log, defaulting to empty"
                );
                Vec::new()
            });
        let guest_email =
            Email::new(self.guest_email).map_err(|e| decode_err("booking guest_email", e))?;
        let guest_phone =
            Phone::new(self.guest_phone).map_err(|e| decode_err("booking guest_phone", e))?;

        Ok(BookingRecord {
            id: BookingId::from_uuid(self.id),
            property_id: PropertyId::from_uuid(self.property_id),
            user_id: UserId::from_uuid(self.user_id),
            guest_name: self.guest_name,
            guest_email,
            guest_phone,
            check_in_date: self.check_in_date,
            check_out_date: self.check_out_date,
            status,
            transition_log,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
