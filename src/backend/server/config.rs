/**
 * Server Configuration
 *
 * Chooses the store backing the board service.
 *
 * # Store Selection
 *
 * With `database_url` set, a PostgreSQL pool is opened and the embedded
 * migrations are run. Without it the server runs on the in-memory store,
 * which is logged as a warning since nothing survives a restart.
 *
 * A configured database that cannot be reached or migrated is a startup
 * error rather than a silent fallback.
 */

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{BoardStore, MemoryStore, PgStore};
use crate::shared::AppConfig;

const MAX_CONNECTIONS: u32 = 10;

/// Load the store described by `config`
///
/// # Returns
///
/// - `PgStore` if `database_url` is set and reachable
/// - `MemoryStore` if `database_url` is not set
pub async fn load_store(config: &AppConfig) -> BackendResult<Arc<dyn BoardStore>> {
    let database_url = match &config.database_url {
        Some(url) => url,
        None => {
            tracing::warn!("DATABASE_URL not set. Using the in-memory store.");
            return Ok(Arc::new(MemoryStore::new()));
        }
    };

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            BackendError::from(e)
        })?;
    tracing::info!("Database connection pool created successfully");

    let store = PgStore::new(pool);
    tracing::info!("Running database migrations...");
    store.migrate().await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {}", e);
        BackendError::state(format!("migration failed: {e}"))
    })?;
    tracing::info!("Database migrations completed successfully");

    Ok(Arc::new(store))
}
