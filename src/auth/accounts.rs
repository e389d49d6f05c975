//! Account registration and credential verification
//!
//! `AccountService` is the only writer of user records. Registration checks
//! the username with a point lookup for a friendly error, but the UNIQUE
//! index on `users.username` is the enforced invariant: a constraint
//! violation from a concurrent insert maps to the same duplicate error.

use std::net::IpAddr;
use std::sync::Arc;

use crate::database::Database;
use crate::error::{AuthError, DbError};
use crate::models::{RegisterRequest, User};

use super::password::{hash_password, verify_password};
use super::ratelimit::{RateLimitConfig, RateLimiter};

/// Registration and login over the user store
pub struct AccountService<D: Database> {
    db: Arc<D>,
    rate_limiter: RateLimiter,
}

impl<D: Database> AccountService<D> {
    /// Create a new account service
    pub fn new(db: Arc<D>, rate_limit: RateLimitConfig) -> Self {
        Self {
            db,
            rate_limiter: RateLimiter::new(rate_limit),
        }
    }

    /// Register a new user
    ///
    /// The plaintext password is hashed before the insert and dropped with
    /// the request; it is never stored or logged.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        if self
            .db
            .find_user_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateUsername);
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(&request.username, &request.name, request.age, password_hash);

        match self.db.create_user(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, username = %user.username, "User registered");
                Ok(user)
            }
            // Lost a concurrent race on the same username; the index caught it
            Err(DbError::ConstraintViolation(_)) => Err(AuthError::DuplicateUsername),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify login credentials
    ///
    /// Fails with the same `InvalidCredentials` whether the username is
    /// unknown or the password mismatches, so responses leak nothing about
    /// which usernames exist. Failed attempts count against the caller's IP.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
        ip: Option<IpAddr>,
    ) -> Result<User, AuthError> {
        if let Some(ip) = ip {
            if self.rate_limiter.is_blocked(ip) {
                return Err(AuthError::RateLimited);
            }
        }

        let user = match self.db.find_user_by_username(username).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                if let Some(ip) = ip {
                    self.rate_limiter.record_failure(ip);
                }
                return Err(AuthError::InvalidCredentials);
            }
        };

        if let Some(ip) = ip {
            self.rate_limiter.reset(ip);
        }

        Ok(user)
    }

    /// Exact-match username lookup (case-sensitive)
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        self.db
            .find_user_by_username(username)
            .await
            .map_err(Into::into)
    }

    /// Check whether an IP is currently blocked from logging in
    pub fn is_rate_limited(&self, ip: IpAddr) -> bool {
        self.rate_limiter.is_blocked(ip)
    }
}
