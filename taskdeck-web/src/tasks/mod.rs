//! Task records and the task repository
//!
//! The repository is a collaborator of the session/authorization core:
//! operations may fail, but a failure never crashes the request pipeline.
//! Like the credential store it comes in a database flavor and an
//! in-memory fallback seeded with demo data.

pub mod database;

use crate::{WebError, WebResult};
use database::DatabaseTaskStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use tracing::info;
use uuid::Uuid;

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = WebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(WebError::Database(format!("unknown priority: {other}"))),
        }
    }
}

/// Task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = WebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(WebError::Database(format!("unknown status: {other}"))),
        }
    }
}

/// A task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_by: Option<String>,
}

/// Fields for a new task; the handlers fill in defaults.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_by: Option<String>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

impl TaskUpdate {
    fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// Demo data served when no database is available.
fn sample_tasks() -> Vec<Task> {
    vec![
        Task {
            id: "1".to_string(),
            title: "Sample Task 1".to_string(),
            description: "Database not available".to_string(),
            priority: TaskPriority::High,
            status: TaskStatus::Pending,
            created_by: None,
        },
        Task {
            id: "2".to_string(),
            title: "Sample Task 2".to_string(),
            description: "Using demo data".to_string(),
            priority: TaskPriority::Medium,
            status: TaskStatus::InProgress,
            created_by: None,
        },
    ]
}

/// Next sequential id for in-memory tasks (keeps ids numeric strings).
fn next_memory_id(tasks: &[Task]) -> String {
    let max = tasks
        .iter()
        .filter_map(|task| task.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

/// Task repository with database and in-memory variants.
#[derive(Debug, Clone)]
pub enum TaskStore {
    Memory {
        tasks: Arc<RwLock<Vec<Task>>>,
    },
    Database(DatabaseTaskStore),
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::memory()
    }
}

impl TaskStore {
    /// Create an in-memory task store seeded with demo tasks.
    pub fn memory() -> Self {
        info!("using in-memory task store with demo data");
        Self::Memory {
            tasks: Arc::new(RwLock::new(sample_tasks())),
        }
    }

    pub async fn list(&self) -> WebResult<Vec<Task>> {
        match self {
            Self::Memory { tasks } => Ok(tasks.read().unwrap().clone()),
            Self::Database(db) => db.list().await,
        }
    }

    pub async fn get(&self, id: &str) -> WebResult<Option<Task>> {
        match self {
            Self::Memory { tasks } => Ok(tasks
                .read()
                .unwrap()
                .iter()
                .find(|task| task.id == id)
                .cloned()),
            Self::Database(db) => db.get(id).await,
        }
    }

    pub async fn create(&self, new_task: NewTask) -> WebResult<Task> {
        match self {
            Self::Memory { tasks } => {
                let mut tasks = tasks.write().unwrap();
                let task = Task {
                    id: next_memory_id(&tasks),
                    title: new_task.title,
                    description: new_task.description,
                    priority: new_task.priority,
                    status: new_task.status,
                    created_by: new_task.created_by,
                };
                tasks.push(task.clone());
                Ok(task)
            }
            Self::Database(db) => {
                let task = Task {
                    id: Uuid::new_v4().to_string(),
                    title: new_task.title,
                    description: new_task.description,
                    priority: new_task.priority,
                    status: new_task.status,
                    created_by: new_task.created_by,
                };
                db.insert(&task).await?;
                Ok(task)
            }
        }
    }

    /// Apply a partial update, returning the new state or None if the id
    /// is unknown.
    pub async fn update(&self, id: &str, update: TaskUpdate) -> WebResult<Option<Task>> {
        match self {
            Self::Memory { tasks } => {
                let mut tasks = tasks.write().unwrap();
                match tasks.iter_mut().find(|task| task.id == id) {
                    Some(task) => {
                        update.apply(task);
                        Ok(Some(task.clone()))
                    }
                    None => Ok(None),
                }
            }
            Self::Database(db) => {
                match db.get(id).await? {
                    Some(mut task) => {
                        update.apply(&mut task);
                        db.replace(&task).await?;
                        Ok(Some(task))
                    }
                    None => Ok(None),
                }
            }
        }
    }

    /// Remove a task; true if something was deleted.
    pub async fn delete(&self, id: &str) -> WebResult<bool> {
        match self {
            Self::Memory { tasks } => {
                let mut tasks = tasks.write().unwrap();
                let before = tasks.len();
                tasks.retain(|task| task.id != id);
                Ok(tasks.len() < before)
            }
            Self::Database(db) => db.delete(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            priority: TaskPriority::Low,
            status: TaskStatus::Pending,
            created_by: Some("alice".to_string()),
        }
    }

    #[tokio::test]
    async fn memory_store_seeds_demo_tasks() {
        let store = TaskStore::memory();
        let tasks = store.list().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "1");
        assert_eq!(tasks[1].status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn memory_ids_stay_sequential() {
        let store = TaskStore::memory();
        let created = store.create(new_task("third")).await.unwrap();
        assert_eq!(created.id, "3");

        store.delete("3").await.unwrap();
        let again = store.create(new_task("fourth")).await.unwrap();
        assert_eq!(again.id, "3");
    }

    #[test]
    fn non_numeric_ids_are_ignored_for_allocation() {
        let mut tasks = sample_tasks();
        tasks.push(Task {
            id: "not-a-number".to_string(),
            ..tasks[0].clone()
        });
        assert_eq!(next_memory_id(&tasks), "3");
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let store = TaskStore::memory();
        let updated = store
            .update(
                "1",
                TaskUpdate {
                    status: Some(TaskStatus::Done),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.title, "Sample Task 1");
    }

    #[tokio::test]
    async fn update_unknown_id_is_none() {
        let store = TaskStore::memory();
        let missing = store.update("99", TaskUpdate::default()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = TaskStore::memory();
        assert!(store.delete("1").await.unwrap());
        assert!(!store.delete("1").await.unwrap());
    }

    #[test]
    fn status_round_trips_through_str() {
        assert_eq!(
            "in-progress".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert!("finished".parse::<TaskStatus>().is_err());
    }
}
