//! Taskdeck - Board Collaboration Backend
//!
//! Taskdeck is the backend of a project-management tool organised as boards,
//! lists and cards. Users collaborate on a board through role-based
//! memberships, and lists and cards keep a stable integer ordering that
//! survives concurrent moves.
//!
//! # Module Structure
//!
//! - **`shared`** - Domain rules with no I/O
//!   - Permission resolver (role → capability set)
//!   - Access evaluator (owner bypass, public-board reads, memberships)
//!   - Ordering planner (append, move, bulk reorder)
//!   - Aggregates, error taxonomy, configuration
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP API with JWT authentication
//!   - Board service routing every action through the access evaluator
//!   - In-memory and PostgreSQL stores applying order changes atomically
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the `backend` module and the
//!   `taskdeck-server` binary
//!
//! # Usage
//!
//! ```rust
//! use taskdeck::shared::{can_act, Actor, Board, Capability};
//! use uuid::Uuid;
//!
//! let owner = Uuid::new_v4();
//! let board = Board::new(owner, "Roadmap", true);
//!
//! let visitor = Actor::resolve(&board, None, None);
//! assert!(can_act(&visitor, &board, Capability::Read));
//! assert!(!can_act(&visitor, &board, Capability::EditBoard));
//! ```

/// Shared domain types and rules
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
