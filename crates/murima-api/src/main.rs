//! Murima API server binary.
//!
//! Reads configuration from the environment, optionally connects to
//! Postgres and rehydrates the in-memory stores, then serves the full
//! router from [`murima_api::app`].

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use murima_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let mut state = AppState::new();
    state.config = Arc::new(config.clone());

    if let Some(database_url) = &config.database_url {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("failed to connect to Postgres")?;
        load_stores(&pool, &state).await?;
        state.db_pool = Some(pool);
        tracing::info!("database connected, stores rehydrated");
    } else {
        tracing::warn!("DATABASE_URL not set — running without persistence");
    }

    let app = murima_api::app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("murima-api listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}

/// Rehydrate every in-memory store from the database.
async fn load_stores(pool: &sqlx::PgPool, state: &AppState) -> anyhow::Result<()> {
    for profile in murima_api::db::profiles::load_all(pool)
        .await
        .context("failed to load profiles")?
    {
        state.profiles.insert(profile.id, profile);
    }
    for property in murima_api::db::properties::load_all(pool)
        .await
        .context("failed to load properties")?
    {
        state.properties.insert(property.id, property);
    }
    for item in murima_api::db::marketplace::load_all(pool)
        .await
        .context("failed to load marketplace items")?
    {
        state.items.insert(item.id, item);
    }
    for service in murima_api::db::movers::load_all(pool)
        .await
        .context("failed to load moving services")?
    {
        state.services.insert(service.id, service);
    }
    for booking in murima_api::db::bookings::load_all(pool)
        .await
        .context("failed to load bookings")?
    {
        state.bookings.insert(booking.id, booking);
    }
    for purchase in murima_api::db::purchases::load_all(pool)
        .await
        .context("failed to load purchases")?
    {
        state.purchases.insert(purchase.id, purchase);
    }
    for quote in murima_api::db::quotes::load_all(pool)
        .await
        .context("failed to load quotes")?
    {
        state.quotes.insert(quote.id, quote);
    }

    tracing::info!(
        profiles = state.profiles.len(),
        properties = state.properties.len(),
        items = state.items.len(),
        services = state.services.len(),
        bookings = state.bookings.len(),
        purchases = state.purchases.len(),
        quotes = state.quotes.len(),
        "stores rehydrated from database"
    );
    Ok(())
}
