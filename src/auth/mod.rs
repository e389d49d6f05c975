//! Authentication and authorization for stockroom
//!
//! This module provides:
//! - Password hashing and verification
//! - Session token issuance and verification
//! - Account registration and login
//! - Ownership checks for item mutation
//! - Rate limiting for failed login attempts

pub mod accounts;
pub mod ownership;
pub mod password;
pub mod ratelimit;
pub mod token;

pub use accounts::AccountService;
pub use ownership::{ensure_owner, NotOwner};
pub use password::{hash_password, verify_password};
pub use ratelimit::{RateLimitConfig, RateLimiter};
pub use token::{Claims, TokenService};
