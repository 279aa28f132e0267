use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use places::build_router;
use places::config::{Config, StoreBackend};
use places::geocoding::{Geocoder, MapboxConfig, MapboxGeocoder};
use places::store::{DocumentStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "places=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting places server on {}", config.server_addr());

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(&config.database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            let store = PgStore::new(pool);
            tracing::info!("Running database migrations...");
            store.migrate().await?;
            tracing::info!("Migrations completed");

            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let geocoder: Arc<dyn Geocoder> = Arc::new(MapboxGeocoder::new(MapboxConfig {
        base_url: config.geocoder_base_url.clone(),
        access_token: config.mapbox_api_key.clone(),
    })?);

    let app = build_router(store, geocoder, config.max_transaction_retries);

    let listener = tokio::net::TcpListener::bind(&config.server_addr()).await?;
    tracing::info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
