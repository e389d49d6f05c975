//! HTTP middleware for stockroom
//!
//! This module provides middleware layers for:
//! - Identity: session token extraction and verification
//! - Request/response logging

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenService;
use crate::error::ApiError;

/// Request header carrying the session token
pub const SESSION_HEADER: &str = "auth-token";

/// Paths reachable without a session
const GATE_SKIP_PATHS: &[&str] = &["/health", "/users/register", "/users/login"];

/// Verified caller identity, attached to the request by the identity gate
///
/// Downstream handlers trust this as-is; it is never re-derived from the
/// database within a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// The authenticated user's id (token `sub` claim)
    pub user_id: String,

    /// Username as of token issuance
    pub username: String,
}

/// Identity gate middleware
///
/// 1. Lets public paths through untouched
/// 2. Extracts the session token from the `auth-token` header
/// 3. Verifies it against the token service
/// 4. Attaches the resolved `Identity` to the request extensions
///
/// A missing credential and an invalid one both reject with 401, but they are
/// logged as distinct conditions.
pub async fn identity_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path();

    if GATE_SKIP_PATHS.iter().any(|p| path.starts_with(p)) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let token = match token {
        Some(token) => token,
        None => {
            tracing::warn!(path = %path, "Request without session token");
            return Err(ApiError::Unauthenticated(
                "Please provide an authentication token".to_string(),
            ));
        }
    };

    match tokens.verify(token) {
        Ok(claims) => {
            request.extensions_mut().insert(Identity {
                user_id: claims.sub,
                username: claims.username,
            });
            Ok(next.run(request).await)
        }
        Err(cause) => {
            tracing::warn!(path = %path, cause = %cause, "Rejected session token");
            Err(ApiError::Unauthenticated(
                "Invalid or expired session token".to_string(),
            ))
        }
    }
}

/// Logging middleware function
///
/// Logs request and response details including:
/// - Method and path
/// - Status code
/// - Response time
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        duration_ms = %elapsed.as_millis(),
        "Request completed"
    );

    response
}
