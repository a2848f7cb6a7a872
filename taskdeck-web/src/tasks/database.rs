//! Sqlite-backed task repository

use super::Task;
use crate::{WebError, WebResult};
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Database-backed task storage, sharing the credential store's pool.
#[derive(Debug, Clone)]
pub struct DatabaseTaskStore {
    pool: SqlitePool,
}

impl DatabaseTaskStore {
    /// Wrap an existing pool and make sure the tasks table exists.
    pub async fn new(pool: SqlitePool) -> WebResult<Self> {
        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> WebResult<()> {
        debug!("creating tasks table");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                priority TEXT NOT NULL DEFAULT 'medium',
                status TEXT NOT NULL DEFAULT 'pending',
                created_by TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to create tasks table: {e}")))?;

        Ok(())
    }

    pub async fn list(&self) -> WebResult<Vec<Task>> {
        let rows = sqlx::query(
            "SELECT id, title, description, priority, status, created_by FROM tasks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to list tasks: {e}")))?;

        rows.into_iter().map(row_to_task).collect()
    }

    pub async fn get(&self, id: &str) -> WebResult<Option<Task>> {
        let row = sqlx::query(
            "SELECT id, title, description, priority, status, created_by FROM tasks WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to fetch task: {e}")))?;

        row.map(row_to_task).transpose()
    }

    pub async fn insert(&self, task: &Task) -> WebResult<()> {
        sqlx::query(
            "INSERT INTO tasks (id, title, description, priority, status, created_by) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_str())
        .bind(task.status.as_str())
        .bind(task.created_by.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to insert task: {e}")))?;

        Ok(())
    }

    pub async fn replace(&self, task: &Task) -> WebResult<()> {
        sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, priority = ?, status = ?, created_by = ? WHERE id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_str())
        .bind(task.status.as_str())
        .bind(task.created_by.as_deref())
        .bind(&task.id)
        .execute(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to update task: {e}")))?;

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> WebResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WebError::Database(format!("Failed to delete task: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_task(row: sqlx::sqlite::SqliteRow) -> WebResult<Task> {
    let priority: String = row
        .try_get("priority")
        .map_err(|e| WebError::Database(format!("Failed to read task row: {e}")))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| WebError::Database(format!("Failed to read task row: {e}")))?;

    Ok(Task {
        id: row
            .try_get("id")
            .map_err(|e| WebError::Database(format!("Failed to read task row: {e}")))?,
        title: row
            .try_get("title")
            .map_err(|e| WebError::Database(format!("Failed to read task row: {e}")))?,
        description: row
            .try_get("description")
            .map_err(|e| WebError::Database(format!("Failed to read task row: {e}")))?,
        priority: priority.parse()?,
        status: status.parse()?,
        created_by: row
            .try_get("created_by")
            .map_err(|e| WebError::Database(format!("Failed to read task row: {e}")))?,
    })
}
