//! Purchase persistence operations, on the `purchases` table.

use chrono::{DateTime, Utc};
use murima_core::{Email, ItemId, Phone, PurchaseId, UserId};
use murima_state::{Lifecycle, OrderStatus, TransitionRecord};
use sqlx::PgPool;
use uuid::Uuid;

use super::{decode_err, encode_err};
use crate::state::PurchaseRecord;

/// Insert a new purchase.
pub async fn insert(pool: &PgPool, purchase: &PurchaseRecord) -> Result<(), sqlx::Error> {
    let transition_log = serde_json::to_value(&purchase.transition_log)
        .map_err(|e| encode_err("purchase transition_log", e))?;

    sqlx::query(
        "INSERT INTO purchases (id, item_id, buyer_id, seller_id, purchase_price, buyer_name,
         buyer_email, buyer_phone, delivery_address, status, transition_log, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(purchase.id.as_uuid())
    .bind(purchase.item_id.as_uuid())
    .bind(purchase.buyer_id.as_uuid())
    .bind(purchase.seller_id.as_uuid())
    .bind(purchase.purchase_price)
    .bind(&purchase.buyer_name)
    .bind(purchase.buyer_email.as_str())
    .bind(purchase.buyer_phone.as_str())
    .bind(&purchase.delivery_address)
    .bind(purchase.status.as_str())
    .bind(&transition_log)
    .bind(purchase.created_at)
    .bind(purchase.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mirror a status transition already committed in memory.
pub async fn update_status(pool: &PgPool, purchase: &PurchaseRecord) -> Result<bool, sqlx::Error> {
    let transition_log = serde_json::to_value(&purchase.transition_log)
        .map_err(|e| encode_err("purchase transition_log", e))?;

    let result = sqlx::query(
        "UPDATE purchases SET status = $1, transition_log = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(purchase.status.as_str())
    .bind(&transition_log)
    .bind(purchase.updated_at)
    .bind(purchase.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all purchases into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<PurchaseRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PurchaseRow>(
        "SELECT id, item_id, buyer_id, seller_id, purchase_price, buyer_name, buyer_email,
         buyer_phone, delivery_address, status, transition_log, created_at, updated_at
         FROM purchases ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(PurchaseRow::into_record).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PurchaseRow {
    id: Uuid,
    item_id: Uuid,
    buyer_id: Uuid,
    seller_id: Uuid,
    purchase_price: i64,
    buyer_name: String,
    buyer_email: String,
    buyer_phone: String,
    delivery_address: Option<String>,
    status: String,
    transition_log: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PurchaseRow {
    fn into_record(self) -> Result<PurchaseRecord, sqlx::Error> {
        let status = OrderStatus::parse(&self.status).unwrap_or_else(|| {
            tracing::warn!(
                id = %self.id,
                status = %self.status,
                "unknown purchase status in database, defaulting to pending"
            );
            OrderStatus::Pending
        });
        let transition_log: Vec<TransitionRecord> =
            serde_json::from_value(self.transition_log).unwrap_or_else(|e| {
                tracing::warn!(
                    id = %self.id,
                    error = %e,
                    "failed to deserialize purchase transition_log, defaulting to empty"
                );
                Vec::new()
            });
        let buyer_email =
            Email::new(self.buyer_email).map_err(|e| decode_err("purchase buyer_email", e))?;
        let buyer_phone =
            Phone::new(self.buyer_phone).map_err(|e| decode_err("purchase buyer_phone", e))?;

        Ok(PurchaseRecord {
            id: PurchaseId::from_uuid(self.id),
            item_id: ItemId::from_uuid(self.item_id),
            buyer_id: UserId::from_uuid(self.buyer_id),
            seller_id: UserId::from_uuid(self.seller_id),
            purchase_price: self.purchase_price,
            buyer_name: self.buyer_name,
            buyer_email,
            buyer_phone,
            delivery_address: self.delivery_address,
            status,
            transition_log,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
