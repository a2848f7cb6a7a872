//! Template system for server-side rendering
//!
//! This module provides templates for server-side rendering using Askama.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use taskdeck_core::{Flash, Role};
use tracing::error;

use crate::tasks::Task;

/// Render a template into a response, 500 on failure.
pub fn render<T: Template>(template: T) -> Response {
    render_status(StatusCode::OK, template)
}

/// Render a template with an explicit status code (error pages).
pub fn render_status<T: Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            error!("template rendering failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Landing page template
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub logged_in: bool,
}

/// Login page template
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub error: Option<String>,
    pub flash: Option<Flash>,
    pub csrf: String,
}

/// Registration page template
#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub title: String,
    pub error: Option<String>,
    pub csrf: String,
}

/// Dashboard page template
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub title: String,
    pub username: String,
    pub is_admin: bool,
    pub flash: Option<Flash>,
    pub csrf: String,
}

/// Task list page template
#[derive(Template)]
#[template(path = "tasks.html")]
pub struct TasksTemplate {
    pub title: String,
    pub username: String,
    pub is_admin: bool,
    pub tasks: Vec<Task>,
    pub flash: Option<Flash>,
    pub csrf: String,
}

/// Task creation page template
#[derive(Template)]
#[template(path = "create_task.html")]
pub struct CreateTaskTemplate {
    pub title: String,
    pub username: String,
    pub error: Option<String>,
    pub csrf: String,
}

/// Task edit page template
#[derive(Template)]
#[template(path = "edit_task.html")]
pub struct EditTaskTemplate {
    pub title: String,
    pub username: String,
    pub task: Task,
    pub csrf: String,
}

/// One row of the admin user listing.
pub struct AdminUserRow {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub online: bool,
    pub last_seen: Option<String>,
}

/// Admin user listing template
#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct AdminUsersTemplate {
    pub title: String,
    pub username: String,
    pub users: Vec<AdminUserRow>,
    pub flash: Option<Flash>,
    pub csrf: String,
}

/// Error page template
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub error_code: u16,
    pub error_message: String,
}

impl IndexTemplate {
    pub fn new(logged_in: bool) -> Self {
        Self {
            title: "Taskdeck".to_string(),
            logged_in,
        }
    }
}

impl LoginTemplate {
    pub fn new(error: Option<String>, flash: Option<Flash>, csrf: String) -> Self {
        Self {
            title: "Taskdeck - Login".to_string(),
            error,
            flash,
            csrf,
        }
    }
}

impl RegisterTemplate {
    pub fn new(error: Option<String>, csrf: String) -> Self {
        Self {
            title: "Taskdeck - Register".to_string(),
            error,
            csrf,
        }
    }
}

impl DashboardTemplate {
    pub fn new(username: String, is_admin: bool, flash: Option<Flash>, csrf: String) -> Self {
        Self {
            title: "Taskdeck - Dashboard".to_string(),
            username,
            is_admin,
            flash,
            csrf,
        }
    }
}

impl TasksTemplate {
    pub fn new(
        username: String,
        is_admin: bool,
        tasks: Vec<Task>,
        flash: Option<Flash>,
        csrf: String,
    ) -> Self {
        Self {
            title: "Taskdeck - Tasks".to_string(),
            username,
            is_admin,
            tasks,
            flash,
            csrf,
        }
    }
}

impl CreateTaskTemplate {
    pub fn new(username: String, error: Option<String>, csrf: String) -> Self {
        Self {
            title: "Taskdeck - New Task".to_string(),
            username,
            error,
            csrf,
        }
    }
}

impl EditTaskTemplate {
    pub fn new(username: String, task: Task, csrf: String) -> Self {
        Self {
            title: format!("Taskdeck - Edit {}", task.title),
            username,
            task,
            csrf,
        }
    }
}

impl AdminUsersTemplate {
    pub fn new(
        username: String,
        users: Vec<AdminUserRow>,
        flash: Option<Flash>,
        csrf: String,
    ) -> Self {
        Self {
            title: "Taskdeck - Users".to_string(),
            username,
            users,
            flash,
            csrf,
        }
    }
}

impl ErrorTemplate {
    pub fn new(error_code: u16, error_message: String) -> Self {
        Self {
            title: format!("Error {} - Taskdeck", error_code),
            error_code,
            error_message,
        }
    }
}
