//! JSON API handlers for tasks
//!
//! Mirrors the page flows without sessions: the API is CSRF-exempt and
//! unauthenticated, returning plain JSON errors with the usual status
//! codes (400 missing title, 404 unknown id, 500 store failure).

use crate::{
    tasks::{NewTask, TaskPriority, TaskStatus, TaskUpdate},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Task creation request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// GET /api/tasks
pub async fn list_tasks(State(state): State<AppState>) -> Response {
    match state.task_store.list().await {
        Ok(tasks) => Json(tasks).into_response(),
        Err(err) => {
            error!("unable to fetch tasks: {}", err);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Unable to fetch tasks")
        }
    }
}

/// GET /api/tasks/{id}
pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.task_store.get(&id).await {
        Ok(Some(task)) => Json(task).into_response(),
        Ok(None) => api_error(StatusCode::NOT_FOUND, "Task not found"),
        Err(err) => {
            error!("unable to fetch task {}: {}", id, err);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Unable to fetch task")
        }
    }
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> Response {
    if request.title.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "Title is required");
    }

    let new_task = NewTask {
        title: request.title.trim().to_string(),
        description: request.description,
        priority: request.priority.unwrap_or(TaskPriority::Low),
        status: request.status.unwrap_or(TaskStatus::Pending),
        created_by: None,
    };

    match state.task_store.create(new_task).await {
        Ok(task) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(err) => {
            error!("unable to create task: {}", err);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Unable to create task")
        }
    }
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<TaskUpdate>,
) -> Response {
    match state.task_store.update(&id, update).await {
        Ok(Some(task)) => Json(task).into_response(),
        Ok(None) => api_error(StatusCode::NOT_FOUND, "Task not found"),
        Err(err) => {
            error!("unable to update task {}: {}", id, err);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Unable to update task")
        }
    }
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.task_store.delete(&id).await {
        Ok(true) => Json(json!({ "message": "Deleted" })).into_response(),
        Ok(false) => api_error(StatusCode::NOT_FOUND, "Task not found"),
        Err(err) => {
            error!("unable to delete task {}: {}", id, err);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Unable to delete task")
        }
    }
}
