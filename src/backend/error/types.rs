/**
 * Backend Error Types
 *
 * This module defines the error type returned by the board service, the
 * stores and the HTTP handlers.
 *
 * # Error Categories
 *
 * ## Domain Errors
 *
 * Rule violations raised by the shared core (authorization, ordering,
 * validation, not found). They carry their own status mapping.
 *
 * ## Database Errors
 *
 * Failures reported by sqlx. Contention on ordering writes never reaches
 * this variant: the PostgreSQL store translates unique violations,
 * serialization failures and deadlocks into `OrderingConflict` first.
 *
 * ## Handler Errors
 *
 * Request-level problems detected by the HTTP layer itself, such as a
 * missing or invalid bearer token.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::BoardError;

/// Generic outward message for both authorization failure kinds
pub const NOT_AUTHORIZED: &str = "Not authorized";

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing token, malformed request)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// State management error (e.g., store misconfiguration)
    #[error("State error: {message}")]
    StateError {
        /// Human-readable error message
        message: String,
    },

    /// Domain rule violation from the shared core
    #[error(transparent)]
    Board(#[from] BoardError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// The domain error, if this is one
    pub fn board_error(&self) -> Option<&BoardError> {
        match self {
            Self::Board(err) => Some(err),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `AccessDenied`, `InsufficientPermission` - 403 Forbidden
    /// - `NotFound` - 404 Not Found
    /// - `OrderingConflict`, `MembershipExists` - 409 Conflict
    /// - `ValidationError`, `InvalidRole`, `OrderingMismatch`,
    ///   `CrossBoardMoveNotAllowed` - 400 Bad Request
    /// - `Database`, `StateError` - 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::StateError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Board(err) => match err {
                BoardError::AccessDenied | BoardError::InsufficientPermission { .. } => {
                    StatusCode::FORBIDDEN
                }
                BoardError::NotFound { .. } => StatusCode::NOT_FOUND,
                BoardError::OrderingConflict { .. } | BoardError::MembershipExists { .. } => {
                    StatusCode::CONFLICT
                }
                BoardError::InvalidRole { .. }
                | BoardError::OrderingMismatch { .. }
                | BoardError::CrossBoardMoveNotAllowed { .. }
                | BoardError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the outward error message
    ///
    /// Authorization failures share one message, and internal failures do
    /// not expose driver details.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Board(err) if err.is_authorization() => NOT_AUTHORIZED.to_string(),
            Self::Board(err) => err.to_string(),
            Self::StateError { .. } | Self::Database(_) => "Internal server error".to_string(),
        }
    }
}
