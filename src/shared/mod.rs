//! Shared Module
//!
//! Platform-agnostic domain code for taskdeck. Nothing in here performs I/O,
//! so every rule can be exercised without a server or a database.
//!
//! # Overview
//!
//! - **`permissions`** - roles, capabilities and the role → permission resolver
//! - **`access`** - the access evaluator (owner bypass, public read, membership check)
//! - **`ordering`** - the ordering planner for lists and cards
//! - **`model`** - board, membership, list and card aggregates
//! - **`error`** - domain error taxonomy
//! - **`config`** - application configuration

/// Domain error types
pub mod error;

/// Roles, capabilities, permission resolver
pub mod permissions;

/// Board/List/Card/Membership aggregates
pub mod model;

/// Access evaluator
pub mod access;

/// Ordering planner
pub mod ordering;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use access::{authorize, can_act, require_access, Actor, EffectiveRole};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::BoardError;
pub use model::{Board, BoardList, Card, Membership};
pub use ordering::{OrderAssignment, OrderingOp, Parent, Sibling};
pub use permissions::{resolve, Capability, PermissionSet, Role};
