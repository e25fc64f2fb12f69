use std::sync::Arc;

use anyhow::Context;
use franchise_api::app::{build_router, AppState};
use franchise_api::config;
use franchise_api::database::{seed_demo_users, DatabaseManager, MemoryStore, PgStore, UserStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("franchise_api=info,tower_http=info")),
        )
        .init();

    let config = config::config().clone();
    config.validate()?;
    tracing::info!("Starting Franchise API in {:?} mode", config.environment);

    let store: Arc<dyn UserStore> = match &config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            if franchise_api::is_production!() {
                anyhow::bail!("DATABASE_URL must be set in production");
            }
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            let store = MemoryStore::new();
            if let Ok(password) = std::env::var("SEED_DEMO_PASSWORD") {
                seed_demo_users(&store, &password).await?;
            }
            Arc::new(store)
        }
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let app = build_router(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Franchise API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
