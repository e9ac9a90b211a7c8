//! Smart Chair server binary

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smartchair_cloud::{create_router, db, AppState};
use smartchair_cloud::config::{Config, StorageBackend};
use smartchair_cloud::store::{MemoryReadingStore, PgReadingStore, ReadingStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    init_tracing(&config);

    tracing::info!("Smart Chair Server starting...");
    tracing::info!("Storage backend: {}", config.storage_backend.as_str());

    let store: Arc<dyn ReadingStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));

            // Initialize database pool
            let pool = db::create_pool(&config.database_url)
                .await
                .context("Failed to create database pool")?;

            // Run migrations
            tracing::info!("Running database migrations...");
            db::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;

            Arc::new(PgReadingStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, readings are lost on restart");
            Arc::new(MemoryReadingStore::new())
        }
    };

    // Build application state
    let state = AppState::new(store, config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "smartchair_cloud=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
