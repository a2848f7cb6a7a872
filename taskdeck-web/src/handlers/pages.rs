//! Server-rendered page handlers
//!
//! Everything under `/tasks` and `/dashboard` sits behind the
//! authentication gate; form posts additionally verify the CSRF token.
//! Behavior on store failures follows the page flow: re-render with an
//! error where the user can retry, otherwise bounce back to the list.

use crate::{
    auth::CurrentUser,
    security::{self, ConfirmForm},
    session::Session,
    tasks::{NewTask, TaskPriority, TaskStatus, TaskUpdate},
    templates::{
        render, render_status, CreateTaskTemplate, DashboardTemplate, EditTaskTemplate,
        ErrorTemplate, IndexTemplate, TasksTemplate,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use taskdeck_core::Flash;
use tracing::error;

/// Task creation form body
#[derive(Debug, Deserialize)]
pub struct CreateTaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

/// Task edit form body; absent fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

fn csrf(session: &Session) -> String {
    session.ensure_csrf()
}

/// Landing page.
pub async fn index(session: Session) -> Response {
    render(IndexTemplate::new(session.identity().is_some()))
}

/// Dashboard page.
pub async fn dashboard(CurrentUser(identity): CurrentUser, session: Session) -> Response {
    let flash = session.take_flash();
    render(DashboardTemplate::new(
        identity.username.clone(),
        identity.is_admin(),
        flash,
        csrf(&session),
    ))
}

/// Task list page.
pub async fn tasks_page(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    session: Session,
) -> Response {
    match state.task_store.list().await {
        Ok(tasks) => {
            let flash = session.take_flash();
            render(TasksTemplate::new(
                identity.username.clone(),
                identity.is_admin(),
                tasks,
                flash,
                csrf(&session),
            ))
        }
        Err(err) => {
            error!("unable to load tasks: {}", err);
            render_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorTemplate::new(500, "Unable to load tasks".to_string()),
            )
        }
    }
}

/// Task creation page.
pub async fn create_task_page(CurrentUser(identity): CurrentUser, session: Session) -> Response {
    render(CreateTaskTemplate::new(
        identity.username,
        None,
        csrf(&session),
    ))
}

/// Handle the task creation form.
pub async fn create_task_submit(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    session: Session,
    Form(form): Form<CreateTaskForm>,
) -> Response {
    if !security::verify_csrf(&session, &form.csrf) {
        return security::csrf_rejection();
    }

    if form.title.trim().is_empty() {
        return render(CreateTaskTemplate::new(
            identity.username,
            Some("Title is required".to_string()),
            csrf(&session),
        ));
    }

    let new_task = NewTask {
        title: form.title.trim().to_string(),
        description: form.description,
        priority: form.priority.unwrap_or(TaskPriority::Medium),
        status: form.status.unwrap_or(TaskStatus::Pending),
        created_by: Some(identity.username.clone()),
    };

    match state.task_store.create(new_task).await {
        Ok(_) => {
            session.set_flash(Flash::success("Task created"));
            Redirect::to("/tasks").into_response()
        }
        Err(err) => {
            error!("unable to create task: {}", err);
            render(CreateTaskTemplate::new(
                identity.username,
                Some("Unable to create task".to_string()),
                csrf(&session),
            ))
        }
    }
}

/// Task edit page; unknown ids bounce back to the list.
pub async fn edit_task_page(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    match state.task_store.get(&id).await {
        Ok(Some(task)) => render(EditTaskTemplate::new(identity.username, task, csrf(&session))),
        Ok(None) => Redirect::to("/tasks").into_response(),
        Err(err) => {
            error!("unable to load task {}: {}", id, err);
            Redirect::to("/tasks").into_response()
        }
    }
}

/// Handle the task edit form.
pub async fn update_task_submit(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<UpdateTaskForm>,
) -> Response {
    if !security::verify_csrf(&session, &form.csrf) {
        return security::csrf_rejection();
    }

    let update = TaskUpdate {
        title: form.title.filter(|title| !title.trim().is_empty()),
        description: form.description,
        priority: form.priority,
        status: form.status,
    };

    match state.task_store.update(&id, update).await {
        Ok(Some(_)) => session.set_flash(Flash::success("Task updated")),
        Ok(None) => {}
        Err(err) => error!("unable to update task {}: {}", id, err),
    }
    Redirect::to("/tasks").into_response()
}

/// Handle the task delete button.
pub async fn delete_task_submit(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Response {
    if !security::verify_csrf(&session, &form.csrf) {
        return security::csrf_rejection();
    }

    match state.task_store.delete(&id).await {
        Ok(true) => session.set_flash(Flash::success("Task deleted")),
        Ok(false) => {}
        Err(err) => error!("unable to delete task {}: {}", id, err),
    }
    Redirect::to("/tasks").into_response()
}

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    render_status(
        StatusCode::NOT_FOUND,
        ErrorTemplate::new(404, "Page not found".to_string()),
    )
}
