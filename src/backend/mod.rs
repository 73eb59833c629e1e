//! Backend Module
//!
//! Server-side code for taskdeck: an axum HTTP API over boards, lists and
//! cards, with JWT authentication and role-based access.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, store selection
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`boards`** - Board API types, service and handlers
//! - **`store`** - Persistence seam with in-memory and PostgreSQL stores
//! - **`auth`** - JWT tokens
//! - **`middleware`** - Bearer-token middleware and caller extractors
//! - **`error`** - Backend error type and its HTTP rendering
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── boards/         - Board API
//! ├── store/          - BoardStore trait and implementations
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! 1. `TraceLayer` opens a span for the request
//! 2. `auth_middleware` verifies the bearer token, if present
//! 3. The handler extracts the caller and calls `BoardService`
//! 4. The service resolves the caller's `Actor`, runs `authorize`, and
//!    calls the store
//! 5. Ordering changes are applied by the store as one atomic unit
//!
//! # Error Handling
//!
//! Every layer returns `BackendError`, which renders as
//! `{"error": ..., "status": ...}`. Both kinds of authorization failure
//! render as the same 403.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Board API
pub mod boards;

/// Persistence
pub mod store;

/// Backend error types
pub mod error;

/// Authentication
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Re-export commonly used types
pub use boards::BoardService;
pub use error::BackendError;
pub use server::create_app;
pub use store::{BoardStore, MemoryStore, PgStore};
