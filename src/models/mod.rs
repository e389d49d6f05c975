//! Domain models for stockroom
//!
//! This module contains the core domain models used throughout the application.

pub mod item;
pub mod user;

// Re-export commonly used types
pub use item::{AttachmentRef, Item, ItemPatch, NewItem};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, User, UserInfo, UserSummary};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Generate an opaque record identifier
///
/// 16 random bytes, URL-safe base64 without padding (22 characters).
pub fn new_record_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
