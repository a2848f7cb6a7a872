//! Route definitions for the Taskdeck web server

use crate::{auth, handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Server-rendered pages (sessions, CSRF-protected forms)
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::pages::index))
        // Authentication
        .route(
            "/login",
            get(auth::handlers::login_page).post(auth::handlers::login_submit),
        )
        .route(
            "/register",
            get(auth::handlers::register_page).post(auth::handlers::register_submit),
        )
        .route("/logout", post(auth::handlers::logout))
        // Authenticated pages
        .route("/dashboard", get(handlers::pages::dashboard))
        .route("/tasks", get(handlers::pages::tasks_page))
        .route(
            "/tasks/create",
            get(handlers::pages::create_task_page).post(handlers::pages::create_task_submit),
        )
        .route("/tasks/{id}/edit", get(handlers::pages::edit_task_page))
        .route(
            "/tasks/{id}/update",
            post(handlers::pages::update_task_submit),
        )
        .route(
            "/tasks/{id}/delete",
            post(handlers::pages::delete_task_submit),
        )
}

/// Admin-only routes, nested under /admin
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::admin::list_users))
        .route("/users/{id}/delete", post(handlers::admin::delete_user))
}

/// JSON API routes, nested under /api (no sessions, no CSRF)
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::api::health_check))
        .route(
            "/tasks",
            get(handlers::api::list_tasks).post(handlers::api::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::api::get_task)
                .put(handlers::api::update_task)
                .delete(handlers::api::delete_task),
        )
}
