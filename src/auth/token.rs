//! Session token issuance and verification
//!
//! Sessions are stateless: an HS256-signed token embeds the subject's id and
//! username plus an expiry, and verification needs only the signing secret.
//! There is no revocation store; a token is valid until its expiry elapses.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::models::User;

/// Claim set embedded in a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id
    pub sub: String,

    /// Subject's username at issuance time
    pub username: String,

    /// Issued-at (unix seconds)
    pub iat: i64,

    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Issues and verifies signed session tokens
///
/// Holds the process-wide signing secret, handed in from configuration at
/// construction; the secret is never read from ambient state.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the signing secret and token lifetime
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Issue a signed token for a user, expiring `ttl` from now
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token's signature and expiry, returning its claims
    ///
    /// The failure causes stay distinct so the gate can log them; callers
    /// outside logging should treat any error as a generic rejection.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    TokenError::SignatureMismatch
                }
                _ => TokenError::Malformed,
            })
    }
}
