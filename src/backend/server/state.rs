/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds:
 * - the board service (which owns the store)
 * - the loaded configuration (JWT secret for the auth middleware)
 *
 * Both are cheap to clone; the store sits behind an `Arc`.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::boards::BoardService;
use crate::shared::AppConfig;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Access-checked board operations
    pub service: BoardService,

    /// Loaded configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(service: BoardService, config: AppConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }
}

/// Implement FromRef for BoardService
///
/// This allows Axum handlers to extract the service directly
/// using `State(BoardService)`.
impl FromRef<AppState> for BoardService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.service.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
