//! Process startup: configuration, logging, database pool.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment-driven configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    /// Lifetime of presigned attachment URLs, in seconds.
    pub presign_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .map(|v| v.parse().context("DATABASE_MAX_CONNECTIONS must be an integer"))
            .transpose()?
            .unwrap_or(10);
        let presign_ttl_secs = std::env::var("PRESIGN_TTL_SECS")
            .ok()
            .map(|v| v.parse().context("PRESIGN_TTL_SECS must be an integer"))
            .transpose()?
            .unwrap_or(900);

        Ok(Self {
            database_url,
            max_connections,
            presign_ttl_secs,
        })
    }
}

/// Initialize logging once at process start.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect the shared connection pool.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Apply pending schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    Ok(())
}
