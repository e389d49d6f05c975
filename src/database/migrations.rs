//! Database migrations for stockroom
//!
//! This module contains SQL migrations for the SQLite database schema.

/// SQL statement to create the initial database schema
///
/// Username uniqueness is enforced here, at the store level; the
/// registration pre-check only exists to produce a friendlier error.
pub const CREATE_SCHEMA: &str = r#"
-- User accounts
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Items, each owned by exactly one user
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL,
    file_name TEXT NOT NULL,
    file_path TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_owner ON items(owner_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_create_schema_valid_sql() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_SCHEMA).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(Result::ok)
            .collect();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"items".to_string()));
    }

    #[test]
    fn test_username_unique_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO users (id, username, name, age, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            rusqlite::params!["u1", "alice1", "Alice", 30, "hash", "2026-01-01T00:00:00Z"],
        )
        .unwrap();

        // Same username with a different id must violate the unique index
        let result = conn.execute(
            "INSERT INTO users (id, username, name, age, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            rusqlite::params!["u2", "alice1", "Other", 25, "hash2", "2026-01-01T00:00:00Z"],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_SCHEMA).unwrap();
        conn.execute_batch(CREATE_SCHEMA).unwrap();
    }
}
