//! Boards Module
//!
//! The board API: request/response types, the access-checked service, and
//! the axum handlers.
//!
//! # Module Structure
//!
//! ```text
//! boards/
//! ├── mod.rs          - Module exports and documentation
//! ├── types.rs        - Request/response bodies
//! ├── service.rs      - BoardService (authorization + store calls)
//! └── handlers.rs     - HTTP handlers
//! ```

/// Request and response types
pub mod types;

/// Access-checked board operations
pub mod service;

/// HTTP handlers
pub mod handlers;

pub use service::BoardService;
