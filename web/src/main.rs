//! Encore server binary.
//!
//! Boots tracing, connects to PostgreSQL, runs migrations, and serves the
//! HTTP surface. Configuration comes from the environment (a `.env` file is
//! honored when present).

use encore_core::QueueEngine;
use encore_postgres::PostgresRequestStore;
use encore_web::{app_router, AppConfig, AppState, StaticTokenActorProvider};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await?;

    let store = PostgresRequestStore::new(pool);
    store.migrate().await?;

    let state = AppState::new(
        QueueEngine::new(store),
        Arc::new(StaticTokenActorProvider::new(
            config.operator_token.clone(),
            config.operator,
        )),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "encore listening");
    axum::serve(listener, app_router(state)).await?;

    Ok(())
}
