//! Route Configuration Module
//!
//! Configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, middleware and tracing
//! └── api_routes.rs   - Board API routes
//! ```
//!
//! # Route Order
//!
//! 1. **Health** - `GET /health`
//! 2. **API Routes** - boards, members, lists, cards
//! 3. **Fallback Handler** - JSON 404

/// Main router creation
pub mod router;

/// Board API routes
pub mod api_routes;

pub use router::create_router;
