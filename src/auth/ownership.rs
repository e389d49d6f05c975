//! Ownership authorization for item mutation
//!
//! An item's `owner_id` is set once at creation and never reassigned. Every
//! mutating handler calls `ensure_owner` after a successful existence lookup
//! and before applying the mutation, so not-found and forbidden stay
//! distinguishable outcomes.

use thiserror::Error;

use crate::error::ApiError;
use crate::models::Item;

/// The caller's verified identity does not match the item's owner
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Caller does not own this item")]
pub struct NotOwner;

impl From<NotOwner> for ApiError {
    fn from(_: NotOwner) -> Self {
        ApiError::Forbidden
    }
}

/// Authorize a mutation: succeeds only for the item's owner
pub fn ensure_owner(item: &Item, caller_id: &str) -> Result<(), NotOwner> {
    if item.owner_id == caller_id {
        Ok(())
    } else {
        Err(NotOwner)
    }
}
