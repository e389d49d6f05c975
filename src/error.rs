//! Application error types for stockroom
//!
//! This module defines common error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling. `ApiError`
//! is the boundary type: every failure a client can observe maps to exactly
//! one variant, with a distinct HTTP status and a stable error kind string.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Account and credential errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username is already taken
    #[error("Username already in use")]
    DuplicateUsername,

    /// Unknown username or wrong password (indistinguishable on purpose)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Too many failed login attempts from this address
    #[error("Rate limited: too many failed attempts")]
    RateLimited,

    /// Password hashing failed
    #[error("Hash failed: {0}")]
    Hash(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Session token verification and issuance errors
///
/// The variants are distinct for logging; clients only ever see a generic
/// rejection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TokenError {
    /// Token is not a structurally valid signed token
    #[error("Malformed token")]
    Malformed,

    /// Token signature is valid but the expiry has elapsed
    #[error("Expired token")]
    Expired,

    /// Token signature does not match the signing secret
    #[error("Token signature mismatch")]
    SignatureMismatch,

    /// Signing a new token failed
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite error
    #[error("Database error: {0}")]
    Sqlite(rusqlite::Error),

    /// Record not found
    #[error("Record not found")]
    NotFound,

    /// Constraint violation (e.g. unique index)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Connection-level failure
    #[error("Database connection error: {0}")]
    Connection(String),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DbError::ConstraintViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                )
            }
            _ => DbError::Sqlite(err),
        }
    }
}

impl From<tokio_rusqlite::Error> for DbError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        match err {
            tokio_rusqlite::Error::Rusqlite(e) => e.into(),
            other => DbError::Connection(other.to_string()),
        }
    }
}

/// Attachment storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error while writing or deleting attachment bytes
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upload contained no bytes
    #[error("Empty attachment payload")]
    EmptyPayload,
}

/// Boundary error type
///
/// Each variant maps to one documented HTTP status and a stable `error` kind
/// so clients can branch programmatically. Internal detail never reaches the
/// response body; it is logged where the failure occurs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing required input
    #[error("{0}")]
    Validation(String),

    /// Registration with a username that already exists
    #[error("Username already in use")]
    DuplicateUsername,

    /// Login with unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, or expired session token
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid session, but the caller does not own the resource
    #[error("You are not allowed to modify this item")]
    Forbidden,

    /// No record with the requested id
    #[error("No record found by this id")]
    NotFound,

    /// Too many failed login attempts
    #[error("Too many failed attempts. Please try again later.")]
    RateLimited,

    /// Attachment could not be stored
    #[error("Failed to store attachment")]
    Ingestion(String),

    /// Unexpected collaborator failure
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Stable kind string carried in the response body
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::DuplicateUsername => "duplicate_username",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound => "not_found",
            ApiError::RateLimited => "rate_limited",
            ApiError::Ingestion(_) => "ingestion_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Documented HTTP status for this kind
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateUsername => StatusCode::CONFLICT,
            ApiError::InvalidCredentials | ApiError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Ingestion(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Server-side faults carry collaborator detail; log it here, where the
        // response is finalized, and keep the body generic.
        match &self {
            ApiError::Ingestion(detail) => {
                tracing::error!(detail = %detail, "Attachment ingestion failed");
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error");
            }
            _ => {}
        }

        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (
            self.status(),
            [(header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUsername => ApiError::DuplicateUsername,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::RateLimited => ApiError::RateLimited,
            AuthError::Hash(detail) => ApiError::Internal(detail),
            AuthError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::EmptyPayload => {
                ApiError::Validation("No file uploaded.".to_string())
            }
            StorageError::Io(e) => ApiError::Ingestion(e.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(detail) => ApiError::Internal(detail),
            _ => ApiError::Unauthenticated("Invalid or expired session token".to_string()),
        }
    }
}
