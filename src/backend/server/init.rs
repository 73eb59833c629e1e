/**
 * Server Initialization
 *
 * Builds the axum application from a configuration.
 *
 * # Initialization Process
 *
 * 1. Load the store (PostgreSQL or in-memory)
 * 2. Wrap it in the board service
 * 3. Create app state and the router
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::boards::BoardService;
use crate::backend::error::BackendResult;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::backend::store::BoardStore;
use crate::shared::AppConfig;

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails if a database is configured but cannot be reached or migrated.
pub async fn create_app(config: AppConfig) -> BackendResult<Router<()>> {
    tracing::info!("Initializing taskdeck backend server");
    let store = load_store(&config).await?;
    Ok(create_app_with_store(config, store))
}

/// Create the application on top of an existing store
///
/// Used by the test suite to share one store between the router and direct
/// assertions.
pub fn create_app_with_store(config: AppConfig, store: Arc<dyn BoardStore>) -> Router<()> {
    let app_state = AppState::new(BoardService::new(store), config);
    let app = create_router(app_state);
    tracing::info!("Router configured");
    app
}
