//! User account models
//!
//! The stored `User` record carries the password hash; API responses use the
//! `UserInfo` and `UserSummary` projections, which never include it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Minimum length for username, display name, and password
pub const MIN_CREDENTIAL_LENGTH: usize = 4;

/// User account stored in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID, assigned at creation
    pub id: String,

    /// Unique login name (case-sensitive exact match)
    pub username: String,

    /// Display name
    pub name: String,

    /// Age
    pub age: u32,

    /// Argon2id hash of the password (PHC format); never the plaintext
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record with a fresh id
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        age: u32,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: super::new_record_id(),
            username: username.into(),
            name: name.into(),
            age,
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// Registration request body
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub name: String,
    pub password: String,
    pub age: u32,
}

impl RegisterRequest {
    /// Validate field constraints before any account work happens
    pub fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("username", &self.username),
            ("name", &self.name),
            ("password", &self.password),
        ] {
            if value.chars().count() < MIN_CREDENTIAL_LENGTH {
                return Err(ApiError::Validation(format!(
                    "Field '{}' must be at least {} characters",
                    field, MIN_CREDENTIAL_LENGTH
                )));
            }
        }
        Ok(())
    }
}

/// Login request body
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Login response: the session token plus a minimal user summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Full user view returned from registration (no password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub name: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            age: user.age,
            created_at: user.created_at,
        }
    }
}

/// Minimal user view embedded in the login response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
        }
    }
}
