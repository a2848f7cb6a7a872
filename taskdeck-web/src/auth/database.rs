//! Sqlite-backed credential store

use super::{users::UserRecord, AuthError};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use taskdeck_core::Role;
use tracing::debug;

/// Database-backed user storage.
#[derive(Debug, Clone)]
pub struct DatabaseUserStore {
    pool: SqlitePool,
}

impl DatabaseUserStore {
    /// Connect and make sure the users table exists.
    pub async fn new(database_url: &str) -> Result<Self, AuthError> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| AuthError::Database(format!("Failed to connect to database: {e}")))?;

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    /// Shared connection pool (the task store reuses it).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_tables(&self) -> Result<(), AuthError> {
        debug!("creating users table");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'normal',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to create users table: {e}")))?;

        Ok(())
    }

    pub async fn insert_user(&self, user: &UserRecord) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to insert user: {e}")))?;

        Ok(())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch user: {e}")))?;

        row.map(row_to_user).transpose()
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch user: {e}")))?;

        row.map(row_to_user).transpose()
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, AuthError> {
        let rows = sqlx::query(
            "SELECT id, username, password_hash, role, created_at FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to list users: {e}")))?;

        rows.into_iter().map(row_to_user).collect()
    }

    pub async fn set_role(&self, user_id: &str, role: Role) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Database(format!("Failed to update role: {e}")))?;

        Ok(())
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<Option<UserRecord>, AuthError> {
        let existing = self.find_by_id(user_id).await?;
        if existing.is_some() {
            sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| AuthError::Database(format!("Failed to delete user: {e}")))?;
        }
        Ok(existing)
    }
}

fn row_to_user(row: sqlx::sqlite::SqliteRow) -> Result<UserRecord, AuthError> {
    let role: String = row
        .try_get("role")
        .map_err(|e| AuthError::Database(format!("Failed to read user row: {e}")))?;
    // Closed role set: a row holding anything else is corrupt, not a
    // third role.
    let role: Role = role
        .parse()
        .map_err(|e| AuthError::Database(format!("Corrupt user row: {e}")))?;

    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| AuthError::Database(format!("Failed to read user row: {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(UserRecord {
        id: row
            .try_get("id")
            .map_err(|e| AuthError::Database(format!("Failed to read user row: {e}")))?,
        username: row
            .try_get("username")
            .map_err(|e| AuthError::Database(format!("Failed to read user row: {e}")))?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|e| AuthError::Database(format!("Failed to read user row: {e}")))?,
        role,
        created_at,
    })
}
