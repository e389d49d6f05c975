//! SQLite implementation of the Database trait
//!
//! This module provides a SQLite-based implementation of the Database trait
//! using rusqlite and tokio-rusqlite for async operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use super::migrations::CREATE_SCHEMA;
use super::Database;
use crate::error::DbError;
use crate::models::{AttachmentRef, Item, ItemPatch, User};

/// SQLite database implementation
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Create a new SQLite database connection
    ///
    /// Use `:memory:` for an in-memory database or a file path for
    /// persistent storage.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let conn = Connection::open(path).await?;

        // Run migrations
        conn.call(|conn| {
            conn.execute_batch(CREATE_SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Create a new in-memory database (useful for testing)
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::new(":memory:").await
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: &User) -> Result<(), DbError> {
        let user = user.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO users (id, username, name, age, password_hash, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    rusqlite::params![
                        user.id,
                        user.username,
                        user.name,
                        user.age,
                        user.password_hash,
                        user.created_at.to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Into::into)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let username = username.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, username, name, age, password_hash, created_at
                    FROM users
                    WHERE username = ?1
                    "#,
                )?;

                let result = stmt.query_row([&username], row_to_user).optional()?;
                Ok(result)
            })
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, DbError> {
        let id = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, username, name, age, password_hash, created_at
                    FROM users
                    WHERE id = ?1
                    "#,
                )?;

                let result = stmt.query_row([&id], row_to_user).optional()?;
                Ok(result)
            })
            .await
            .map_err(Into::into)
    }

    // =========================================================================
    // Item operations
    // =========================================================================

    async fn create_item(&self, item: &Item) -> Result<(), DbError> {
        let item = item.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO items
                    (id, owner_id, title, description, status, file_name, file_path, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    "#,
                    rusqlite::params![
                        item.id,
                        item.owner_id,
                        item.title,
                        item.description,
                        item.status,
                        item.attachment.file_name,
                        item.attachment.file_path,
                        item.created_at.to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Into::into)
    }

    async fn list_items_by_owner(&self, owner_id: &str) -> Result<Vec<Item>, DbError> {
        let owner_id = owner_id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, owner_id, title, description, status, file_name, file_path, created_at
                    FROM items
                    WHERE owner_id = ?1
                    ORDER BY rowid
                    "#,
                )?;

                let items = stmt
                    .query_map([&owner_id], row_to_item)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(items)
            })
            .await
            .map_err(Into::into)
    }

    async fn get_item(&self, id: &str) -> Result<Option<Item>, DbError> {
        let id = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, owner_id, title, description, status, file_name, file_path, created_at
                    FROM items
                    WHERE id = ?1
                    "#,
                )?;

                let result = stmt.query_row([&id], row_to_item).optional()?;
                Ok(result)
            })
            .await
            .map_err(Into::into)
    }

    async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<Option<Item>, DbError> {
        let id = id.to_string();
        let title = patch.title.clone();
        let description = patch.description.clone();
        let status = patch.status.clone();
        let file_name = patch.attachment.as_ref().map(|a| a.file_name.clone());
        let file_path = patch.attachment.as_ref().map(|a| a.file_path.clone());

        self.conn
            .call(move |conn| {
                // NULL patch values leave the stored column untouched
                let rows = conn.execute(
                    r#"
                    UPDATE items SET
                        title = COALESCE(?2, title),
                        description = COALESCE(?3, description),
                        status = COALESCE(?4, status),
                        file_name = COALESCE(?5, file_name),
                        file_path = COALESCE(?6, file_path)
                    WHERE id = ?1
                    "#,
                    rusqlite::params![id, title, description, status, file_name, file_path],
                )?;

                if rows == 0 {
                    return Ok(None);
                }

                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, owner_id, title, description, status, file_name, file_path, created_at
                    FROM items
                    WHERE id = ?1
                    "#,
                )?;
                let updated = stmt.query_row([&id], row_to_item).optional()?;
                Ok(updated)
            })
            .await
            .map_err(Into::into)
    }

    async fn delete_item(&self, id: &str) -> Result<bool, DbError> {
        let id = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn.execute("DELETE FROM items WHERE id = ?1", [&id])?;
                Ok(rows > 0)
            })
            .await
            .map_err(Into::into)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        age: row.get(3)?,
        password_hash: row.get(4)?,
        created_at: parse_datetime(row.get(5)?, 5)?,
    })
}

fn row_to_item(row: &rusqlite::Row<'_>) -> Result<Item, rusqlite::Error> {
    Ok(Item {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        attachment: AttachmentRef {
            file_name: row.get(5)?,
            file_path: row.get(6)?,
        },
        created_at: parse_datetime(row.get(7)?, 7)?,
    })
}

fn parse_datetime(value: String, column: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewItem;

    fn sample_user(username: &str) -> User {
        User::new(username, "Test User", 30, "$argon2id$stub")
    }

    fn sample_item(owner: &str, title: &str) -> Item {
        Item::new(
            owner,
            NewItem {
                title: title.to_string(),
                description: "A thing worth tracking".to_string(),
                status: "active".to_string(),
            },
            AttachmentRef {
                file_name: format!("item_image-{}-0.jpg", title),
                file_path: format!("uploads/item_image-{}-0.jpg", title),
            },
        )
    }

    // Test 1: user round trip preserves all fields
    #[tokio::test]
    async fn test_user_round_trip() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let user = sample_user("alice1");

        db.create_user(&user).await.unwrap();
        let loaded = db.find_user_by_username("alice1").await.unwrap().unwrap();

        assert_eq!(loaded.id, user.id);
        assert_eq!(loaded.username, "alice1");
        assert_eq!(loaded.age, 30);
        assert_eq!(loaded.password_hash, user.password_hash);
        assert_eq!(
            loaded.created_at.timestamp(),
            user.created_at.timestamp()
        );
    }

    // Test 2: duplicate username violates the unique index
    #[tokio::test]
    async fn test_duplicate_username_constraint() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.create_user(&sample_user("alice1")).await.unwrap();

        let result = db.create_user(&sample_user("alice1")).await;
        assert!(matches!(result, Err(DbError::ConstraintViolation(_))));
    }

    // Test 3: username lookup is case-sensitive
    #[tokio::test]
    async fn test_username_lookup_case_sensitive() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.create_user(&sample_user("alice1")).await.unwrap();

        assert!(db.find_user_by_username("Alice1").await.unwrap().is_none());
        assert!(db.find_user_by_username("alice1").await.unwrap().is_some());
    }

    // Test 4: get_user by id
    #[tokio::test]
    async fn test_get_user_by_id() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let user = sample_user("alice1");
        db.create_user(&user).await.unwrap();

        assert!(db.get_user(&user.id).await.unwrap().is_some());
        assert!(db.get_user("missing").await.unwrap().is_none());
    }

    // Test 5: item round trip, including the attachment reference
    #[tokio::test]
    async fn test_item_round_trip() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let item = sample_item("user-a", "camera");

        db.create_item(&item).await.unwrap();
        let loaded = db.get_item(&item.id).await.unwrap().unwrap();

        assert_eq!(loaded.owner_id, "user-a");
        assert_eq!(loaded.title, "camera");
        assert_eq!(loaded.attachment, item.attachment);
    }

    // Test 6: listing is owner-scoped and in insertion order
    #[tokio::test]
    async fn test_list_items_by_owner() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.create_item(&sample_item("user-a", "first")).await.unwrap();
        db.create_item(&sample_item("user-b", "other")).await.unwrap();
        db.create_item(&sample_item("user-a", "second")).await.unwrap();

        let items = db.list_items_by_owner("user-a").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "first");
        assert_eq!(items[1].title, "second");

        let none = db.list_items_by_owner("user-c").await.unwrap();
        assert!(none.is_empty());
    }

    // Test 7: a title-only patch leaves every other field unchanged
    #[tokio::test]
    async fn test_update_item_partial() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let item = sample_item("user-a", "camera");
        db.create_item(&item).await.unwrap();

        let patch = ItemPatch {
            title: Some("renamed".to_string()),
            ..Default::default()
        };
        let updated = db.update_item(&item.id, &patch).await.unwrap().unwrap();

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.description, item.description);
        assert_eq!(updated.status, item.status);
        assert_eq!(updated.attachment, item.attachment);
        assert_eq!(updated.owner_id, item.owner_id);
    }

    // Test 8: owner_id survives any sequence of updates
    #[tokio::test]
    async fn test_owner_never_reassigned() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let item = sample_item("user-a", "camera");
        db.create_item(&item).await.unwrap();

        let patch = ItemPatch {
            title: Some("one".to_string()),
            description: Some("first rewrite".to_string()),
            status: Some("archived".to_string()),
            attachment: Some(AttachmentRef {
                file_name: "item_image-2-1.png".to_string(),
                file_path: "uploads/item_image-2-1.png".to_string(),
            }),
        };
        let updated = db.update_item(&item.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.owner_id, "user-a");

        let again = db
            .update_item(&item.id, &ItemPatch {
                title: Some("two".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.owner_id, "user-a");
    }

    // Test 9: updating a missing item returns None
    #[tokio::test]
    async fn test_update_missing_item() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let patch = ItemPatch {
            title: Some("ghost".to_string()),
            ..Default::default()
        };
        let result = db.update_item("missing", &patch).await.unwrap();
        assert!(result.is_none());
    }

    // Test 10: delete reports whether a record existed
    #[tokio::test]
    async fn test_delete_item() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let item = sample_item("user-a", "camera");
        db.create_item(&item).await.unwrap();

        assert!(db.delete_item(&item.id).await.unwrap());
        assert!(db.get_item(&item.id).await.unwrap().is_none());
        assert!(!db.delete_item(&item.id).await.unwrap());
    }
}
