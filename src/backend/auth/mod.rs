//! Authentication Module
//!
//! Bearer-token verification for the board API. Users, registration and
//! password handling belong to the identity service that issues the
//! tokens; this module only checks them.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! └── sessions.rs     - JWT token management
//! ```
//!
//! # Security
//!
//! - Tokens are HS256 JWTs signed with `AppConfig::jwt_secret`
//! - A malformed or expired token is rejected with 401
//! - A request without a token is treated as anonymous, which only ever
//!   grants reads on public boards

/// JWT token generation and validation
pub mod sessions;

pub use sessions::{create_token, verify_token, Claims};
