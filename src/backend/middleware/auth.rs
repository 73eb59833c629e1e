/**
 * Authentication Middleware
 *
 * Reads the `Authorization: Bearer <token>` header, verifies the token and
 * attaches the caller to the request extensions.
 *
 * - valid token: `AuthenticatedUser` is inserted
 * - malformed header or invalid token: 401
 * - no header: the request continues anonymously
 *
 * Handlers pick the caller up with [`AuthUser`] (required) or
 * [`MaybeAuthUser`] (optional).
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts JWT token from Authorization header, if any
/// 2. Verifies the token against the configured secret
/// 3. Attaches user data to request extensions for use in handlers
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request.headers().get(AUTHORIZATION) {
        Some(value) => value,
        None => return next.run(request).await,
    };

    let token = match auth_header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        Some(token) => token,
        None => {
            tracing::warn!("Invalid Authorization header format");
            return unauthorized("Invalid Authorization header");
        }
    };

    let claims = match verify_token(token, &app_state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Invalid token: {:?}", e);
            return unauthorized("Invalid token");
        }
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Invalid user ID in token: {:?}", e);
            return unauthorized("Invalid token");
        }
    };

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
    });

    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    BackendError::handler(StatusCode::UNAUTHORIZED, message).into_response()
}

/// Extract authenticated user from request extensions
pub fn extract_authenticated_user(parts: &Parts) -> Option<AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>().cloned()
}

/// Axum extractor for a required authenticated user
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        extract_authenticated_user(parts).map(AuthUser).ok_or_else(|| {
            tracing::warn!("Authentication required for {}", parts.uri.path());
            BackendError::handler(StatusCode::UNAUTHORIZED, "Authentication required")
        })
    }
}

/// Axum extractor for an optional user; anonymous callers get `None`
#[derive(Clone, Debug)]
pub struct MaybeAuthUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(extract_authenticated_user(parts)))
    }
}
