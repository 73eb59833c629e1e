//! Middleware Module
//!
//! HTTP middleware for the backend server.
//!
//! - **`auth`** - bearer-token verification and the caller extractors

pub mod auth;

pub use auth::{
    auth_middleware, extract_authenticated_user, AuthUser, AuthenticatedUser, MaybeAuthUser,
};
