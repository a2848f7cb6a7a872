//! JSON task API integration tests (in-memory fallback store)

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use taskdeck_web::{create_app, AppState, WebConfig};
use tower::ServiceExt;

async fn test_app() -> Router {
    let config = WebConfig {
        session_keys: vec!["test-session-key".to_string()],
        ..Default::default()
    };
    let state = AppState::new(config).await.unwrap();
    create_app(state)
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = if let Some(body) = body {
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_works() {
    let app = test_app().await;
    let response = request(&app, "GET", "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn listing_returns_the_seeded_demo_tasks() {
    let app = test_app().await;
    let response = request(&app, "GET", "/api/tasks", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let tasks = json_body(response).await;
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["id"], "1");
    assert_eq!(tasks[0]["title"], "Sample Task 1");
    assert_eq!(tasks[1]["status"], "in-progress");
}

#[tokio::test]
async fn fetching_a_single_task() {
    let app = test_app().await;

    let response = request(&app, "GET", "/api/tasks/1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["title"], "Sample Task 1");

    let response = request(&app, "GET", "/api/tasks/99", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Task not found");
}

#[tokio::test]
async fn creating_a_task_defaults_and_allocates_the_next_id() {
    let app = test_app().await;

    let response = request(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "title": "Write report" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let task = json_body(response).await;
    assert_eq!(task["id"], "3");
    assert_eq!(task["priority"], "low");
    assert_eq!(task["status"], "pending");
    assert!(task["created_by"].is_null());
}

#[tokio::test]
async fn creating_a_task_requires_a_title() {
    let app = test_app().await;

    let response = request(&app, "POST", "/api/tasks", Some(json!({ "title": "  " }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Title is required");

    let response = request(&app, "POST", "/api/tasks", Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updating_a_task_merges_fields() {
    let app = test_app().await;

    let response = request(
        &app,
        "PUT",
        "/api/tasks/1",
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let task = json_body(response).await;
    assert_eq!(task["status"], "done");
    assert_eq!(task["title"], "Sample Task 1");

    let response = request(
        &app,
        "PUT",
        "/api/tasks/99",
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_task_is_idempotent_in_outcome() {
    let app = test_app().await;

    let response = request(&app, "DELETE", "/api/tasks/2", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "Deleted");

    let response = request(&app, "DELETE", "/api/tasks/2", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_requests_do_not_need_a_session() {
    let app = test_app().await;

    // No cookie, no CSRF token; the API is exempt from both.
    let response = request(&app, "GET", "/api/tasks", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = request(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "title": "no session required" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}
