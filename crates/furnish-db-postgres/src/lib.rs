//! PostgreSQL backend for the product and user repositories.
//!
//! Queries go through sqlx with explicit tuple mappings; schema changes
//! are embedded migrations run at startup.

mod config;
mod error;
mod pool;
mod products;
mod users;

pub use config::PostgresConfig;
pub use pool::{connect, create_pool};
pub use products::PostgresProductRepository;
pub use users::PostgresUserRepository;

use furnish_storage::StorageError;
use sqlx::PgPool;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Applies all pending embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StorageError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|err| StorageError::internal(format!("migration failed: {err}")))?;
    tracing::info!("database migrations applied");
    Ok(())
}
