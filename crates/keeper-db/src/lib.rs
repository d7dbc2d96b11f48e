//! # keeper-db
//!
//! Database layer for keeper — PostgreSQL only. The spec names a single
//! relational engine with no lite/embedded mode, so this stays a plain
//! `sqlx::PgPool` rather than the multi-backend abstraction a larger
//! service might carry.

pub mod postgres;
pub mod repository;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Shared database state passed through axum extractors.
#[derive(Clone)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    /// Connect using `config.database_url`.
    pub async fn connect(config: &keeper_common::config::AppConfig) -> Result<Self> {
        tracing::info!("connecting to PostgreSQL");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(std::time::Duration::from_secs(config.query_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Run embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("migrations complete");
        Ok(())
    }
}
