//! Database layer for stockroom
//!
//! This module defines the database trait and SQLite implementation.

pub mod migrations;
pub mod sqlite;

pub use sqlite::SqliteDatabase;

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{Item, ItemPatch, User};

/// Database trait for data persistence
///
/// This trait defines all database operations needed by the application.
/// It uses `async_trait` for async methods and `mockall::automock` for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Database: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Insert a user record
    ///
    /// Fails with `DbError::ConstraintViolation` when the username is taken.
    async fn create_user(&self, user: &User) -> Result<(), DbError>;

    /// Look up a user by username (case-sensitive exact match)
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    /// Look up a user by id
    async fn get_user(&self, id: &str) -> Result<Option<User>, DbError>;

    // =========================================================================
    // Item operations
    // =========================================================================

    /// Insert an item record
    async fn create_item(&self, item: &Item) -> Result<(), DbError>;

    /// All items owned by a user, in insertion order
    async fn list_items_by_owner(&self, owner_id: &str) -> Result<Vec<Item>, DbError>;

    /// Look up an item by id, regardless of owner
    async fn get_item(&self, id: &str) -> Result<Option<Item>, DbError>;

    /// Apply a partial update; fields absent from the patch are untouched
    ///
    /// Returns the updated item, or `None` if no item has this id.
    async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<Option<Item>, DbError>;

    /// Delete an item by id; returns whether a record was removed
    async fn delete_item(&self, id: &str) -> Result<bool, DbError>;
}
