//! # Application State
//!
//! In-memory stores behind `parking_lot` locks, plus the transaction record
//! types that pair a domain entity with its lifecycle status and transition
//! log. The stores are the source of truth at runtime; Postgres, when
//! configured, is a write-through replica loaded at startup.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use murima_core::{
    BookingId, Email, ItemId, Phone, Profile, PropertyId, PurchaseId, QuoteId, ServiceId, UserId,
};
use murima_listing::{MarketplaceItem, MovingService, Property};
use murima_media::{InMemoryMediaStore, MediaStore};
use murima_state::{OrderStatus, QuoteStatus, TransitionRecord};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::auth::{CredentialRecord, Session};

/// A keyed in-memory store. Cheap to clone (the map is shared).
#[derive(Debug, Default)]
pub struct Store<K, V> {
    inner: Arc<parking_lot::RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Store<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(parking_lot::RwLock::new(HashMap::new())),
        }
    }

    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.write().insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.read().get(key).cloned()
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains_key(key)
    }

    pub fn list(&self) -> Vec<V> {
        self.inner.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Find the first value satisfying `pred`.
    pub fn find(&self, pred: impl Fn(&V) -> bool) -> Option<V> {
        self.inner.read().values().find(|v| pred(v)).cloned()
    }

    /// Atomically read-validate-update under a single write lock.
    ///
    /// Returns `None` when the key is absent, otherwise the closure's
    /// result. Holding the write lock across validate-and-apply removes the
    /// TOCTOU race where two concurrent transition requests could both pass
    /// validation against the same starting status.
    pub fn try_update<R, E>(
        &self,
        key: &K,
        f: impl FnOnce(&mut V) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        let mut guard = self.inner.write();
        guard.get_mut(key).map(f)
    }
}

/// A booking of a property (rental viewing, stay, or office).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingRecord {
    #[schema(value_type = String, format = Uuid)]
    pub id: BookingId,
    #[schema(value_type = String, format = Uuid)]
    pub property_id: PropertyId,
    /// The authenticated user who submitted the booking.
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    pub guest_name: String,
    #[schema(value_type = String)]
    pub guest_email: Email,
    #[schema(value_type = String)]
    pub guest_phone: Phone,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    #[schema(value_type = String)]
    pub status: OrderStatus,
    /// Audit trail of applied transitions, append-only.
    #[schema(value_type = Vec<Object>)]
    pub transition_log: Vec<TransitionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchase of a marketplace item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseRecord {
    #[schema(value_type = String, format = Uuid)]
    pub id: PurchaseId,
    #[schema(value_type = String, format = Uuid)]
    pub item_id: ItemId,
    #[schema(value_type = String, format = Uuid)]
    pub buyer_id: UserId,
    /// The item's owner at submission time.
    #[schema(value_type = String, format = Uuid)]
    pub seller_id: UserId,
    /// Copied from the item at submission; later item edits do not affect it.
    pub purchase_price: i64,
    pub buyer_name: String,
    #[schema(value_type = String)]
    pub buyer_email: Email,
    #[schema(value_type = String)]
    pub buyer_phone: Phone,
    pub delivery_address: Option<String>,
    #[schema(value_type = String)]
    pub status: OrderStatus,
    #[schema(value_type = Vec<Object>)]
    pub transition_log: Vec<TransitionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A moving-quote request against a mover service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteRecord {
    #[schema(value_type = String, format = Uuid)]
    pub id: QuoteId,
    #[schema(value_type = String, format = Uuid)]
    pub service_id: ServiceId,
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    pub client_name: String,
    #[schema(value_type = String)]
    pub client_email: Email,
    #[schema(value_type = String)]
    pub client_phone: Phone,
    pub pickup_location: String,
    pub delivery_location: String,
    pub moving_date: NaiveDate,
    /// Free-text inventory description.
    pub inventory: Option<String>,
    /// Set exclusively by the `quoted` transition.
    pub quote_amount: Option<i64>,
    #[schema(value_type = String)]
    pub status: QuoteStatus,
    #[schema(value_type = Vec<Object>)]
    pub transition_log: Vec<TransitionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Server configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address, `MURIMA_BIND_ADDR` (default `0.0.0.0:8080`).
    pub bind_addr: String,
    /// Optional Postgres write-through, `DATABASE_URL`.
    pub database_url: Option<String>,
    /// Object-storage bucket for listing images, `MURIMA_MEDIA_BUCKET`.
    pub media_bucket: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: None,
            media_bucket: "listings".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("MURIMA_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
            media_bucket: std::env::var("MURIMA_MEDIA_BUCKET")
                .unwrap_or_else(|_| "listings".to_string()),
        }
    }
}

/// Shared application state. Clones are cheap; every store is Arc-backed.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Store<UserId, Profile>,
    /// Password records keyed by normalized email.
    pub credentials: Store<String, CredentialRecord>,
    /// Active sessions keyed by opaque token.
    pub sessions: Store<String, Session>,
    pub properties: Store<PropertyId, Property>,
    pub items: Store<ItemId, MarketplaceItem>,
    pub services: Store<ServiceId, MovingService>,
    pub bookings: Store<BookingId, BookingRecord>,
    pub purchases: Store<PurchaseId, PurchaseRecord>,
    pub quotes: Store<QuoteId, QuoteRecord>,
    pub media: Arc<dyn MediaStore>,
    pub db_pool: Option<PgPool>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Fresh state with empty stores and the in-memory media store. Used by
    /// tests and by deployments with no object storage configured.
    pub fn new() -> Self {
        Self::with_media(Arc::new(InMemoryMediaStore::new()))
    }

    pub fn with_media(media: Arc<dyn MediaStore>) -> Self {
        Self {
            profiles: Store::new(),
            credentials: Store::new(),
            sessions: Store::new(),
            properties: Store::new(),
            items: Store::new(),
            services: Store::new(),
            bookings: Store::new(),
            purchases: Store::new(),
            quotes: Store::new(),
            media,
            db_pool: None,
            config: Arc::new(AppConfig::default()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
