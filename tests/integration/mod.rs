//! Integration tests
//!
//! - `service` - board service on the in-memory store
//! - `api` - HTTP requests through the full router
//! - `database` - PostgreSQL store (needs `DATABASE_URL`)

#[cfg(feature = "ssr")]
mod database;
#[cfg(feature = "ssr")]
mod service;
