//! Board Error Types
//!
//! This module defines the error taxonomy of the access-control and ordering
//! core. These errors are produced by pure domain code (resolver, evaluator,
//! ordering planner) and by the persistence layer, and are converted into
//! HTTP responses by the backend.
//!
//! # Error Categories
//!
//! - `InvalidRole` - unknown role value handed to the permission resolver
//! - `AccessDenied` / `InsufficientPermission` - authorization failures
//! - `OrderingMismatch` - bulk reorder names an item of another parent
//! - `OrderingConflict` - concurrent ordering writes collided; retryable
//! - `CrossBoardMoveNotAllowed` - card move targets a list on another board
//! - `NotFound`, `MembershipExists`, `ValidationError` - surrounding CRUD
//!
//! # Authorization failures
//!
//! `AccessDenied` and `InsufficientPermission` are kept apart for logging
//! only. [`BoardError::is_authorization`] lets callers collapse both into
//! one outcome.
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the board core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Role name outside the closed admin/editor/viewer set
    #[error("Invalid role: {role}")]
    InvalidRole {
        /// The rejected role value
        role: String,
    },

    /// The actor has no relationship to the board at all
    #[error("Access denied")]
    AccessDenied,

    /// The actor is a member but lacks the requested capability
    #[error("Insufficient permission: {capability}")]
    InsufficientPermission {
        /// Name of the capability that was missing
        capability: String,
    },

    /// An item in a bulk reorder does not belong to the stated parent
    #[error("Item {item} does not belong to parent {parent}")]
    OrderingMismatch {
        /// Offending item
        item: Uuid,
        /// Parent the batch was addressed to
        parent: Uuid,
    },

    /// Two writers raced on the same parent's ordering
    #[error("Ordering conflict under parent {parent}")]
    OrderingConflict {
        /// Parent whose ordering was contended
        parent: Uuid,
    },

    /// Card move to a list that lives on a different board
    #[error("Card {card} cannot move to list {list} on another board")]
    CrossBoardMoveNotAllowed {
        /// Card being moved
        card: Uuid,
        /// Destination list
        list: Uuid,
    },

    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("board", "list", ...)
        entity: &'static str,
        /// Requested id
        id: Uuid,
    },

    /// A membership for this (board, user) pair already exists
    #[error("User {user} is already a member of board {board}")]
    MembershipExists {
        /// Board id
        board: Uuid,
        /// User id
        user: Uuid,
    },

    /// Input validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl BoardError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// True for both authorization failure kinds
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::InsufficientPermission { .. }
        )
    }
}
