//! # Pump-Fiction DB
//!
//! PostgreSQL connection pool and embedded schema migrations.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required for the postgres backend)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
//!
//! ```ignore
//! let pool = pumpfiction_db::init_db_pool().await?;
//! pumpfiction_db::run_migrations(&pool).await?;
//! ```

use std::env;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;

/// Migrations under the workspace `migrations/` directory, embedded at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, thiserror::Error)]
pub enum DbInitError {
    #[error("DATABASE_URL must be set")]
    MissingUrl,
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),
}

/// Connects a pool using `DATABASE_URL`.
///
/// The returned pool is cheaply cloneable and shared by the store adapters.
pub async fn init_db_pool() -> Result<PgPool, DbInitError> {
    let database_url = env::var("DATABASE_URL").map_err(|_| DbInitError::MissingUrl)?;
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .map_err(DbInitError::Connect)?;

    tracing::info!(max_connections, "database pool ready");
    Ok(pool)
}

/// Applies any pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}
