//! Password hashing and verification
//!
//! Passwords are hashed with Argon2id. The salt is random per hash and
//! embedded in the PHC output, so hashing the same password twice yields
//! different strings that both verify.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::AuthError;

/// Hash a plaintext password with Argon2id
///
/// Returns the PHC-format hash string. Deliberately expensive; call it from a
/// request context only when registering or changing a password.
pub fn hash_password(plaintext: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a plaintext password against a stored hash
///
/// Returns `false` for a mismatch or a malformed hash; never errors. The
/// comparison inside the argon2 crate is constant-time.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: hash produces an argon2id PHC string
    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("pass1234").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    // Test 2: same password hashes to different strings (random salt)
    #[test]
    fn test_hash_password_unique_salts() {
        let hash1 = hash_password("pass1234").unwrap();
        let hash2 = hash_password("pass1234").unwrap();
        assert_ne!(hash1, hash2);
    }

    // Test 3: both salted hashes verify the original password
    #[test]
    fn test_verify_across_salts() {
        let hash1 = hash_password("pass1234").unwrap();
        let hash2 = hash_password("pass1234").unwrap();
        assert!(verify_password("pass1234", &hash1));
        assert!(verify_password("pass1234", &hash2));
    }

    // Test 4: wrong password fails verification
    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("pass1234").unwrap();
        assert!(!verify_password("wrong password", &hash));
    }

    // Test 5: malformed hash returns false instead of erroring
    #[test]
    fn test_verify_malformed_hash() {
        assert!(!verify_password("pass1234", "not a phc string"));
        assert!(!verify_password("pass1234", ""));
        assert!(!verify_password("pass1234", "$argon2id$truncated"));
    }
}
