use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use matrix_pms::app::{self, AppState};
use matrix_pms::config::AppConfig;
use matrix_pms::database::{schema, DatabaseManager, PgUserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("matrix_pms=info,tower_http=info"));
    if !config.security.enable_audit_logging {
        filter = filter.add_directive("audit=off".parse()?);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Matrix PMS in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    schema::ensure_schema(&pool)
        .await
        .context("failed to prepare users table")?;

    let port = config.api.port;
    let state = AppState::new(config, Arc::new(PgUserStore::new(pool.clone())));
    let router = app::router(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Matrix PMS listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;

    DatabaseManager::close(pool).await;
    Ok(())
}
