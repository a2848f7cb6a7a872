//! Server-rendered task page integration tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
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

fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or("").to_string())
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

fn extract_csrf(html: &str) -> String {
    let marker = "name=\"_csrf\" value=\"";
    let start = html.find(marker).expect("form should embed a CSRF token") + marker.len();
    html[start..].split('"').next().unwrap().to_string()
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, cookie: Option<&str>, form: &str) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(form.to_string())).unwrap())
        .await
        .unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = get(app, "/login", None).await;
    let cookie = session_cookie(&response).unwrap();
    let csrf = extract_csrf(&body_string(response).await);

    let form = format!("username={username}&password={password}&_csrf={csrf}");
    let response = post_form(app, "/login", Some(&cookie), &form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response).unwrap()
}

#[tokio::test]
async fn task_pages_require_authentication() {
    let app = test_app().await;

    for uri in ["/tasks", "/tasks/create", "/tasks/1/edit"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "uri: {uri}");
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login",
            "uri: {uri}"
        );
    }
}

#[tokio::test]
async fn create_task_flow_sets_a_one_shot_flash() {
    let app = test_app().await;
    let cookie = login(&app, "alice", "alice").await;

    let response = get(&app, "/tasks/create", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).unwrap_or(cookie);
    let csrf = extract_csrf(&body_string(response).await);

    let form = format!("title=Ship+it&description=soon&priority=high&status=pending&_csrf={csrf}");
    let response = post_form(&app, "/tasks/create", Some(&cookie), &form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/tasks");
    let cookie = session_cookie(&response).unwrap_or(cookie);

    // First view renders the flash and the new task.
    let response = get(&app, "/tasks", Some(&cookie)).await;
    let cookie = session_cookie(&response).unwrap_or(cookie);
    let html = body_string(response).await;
    assert!(html.contains("Task created"));
    assert!(html.contains("Ship it"));

    // Second view: the flash was consumed.
    let response = get(&app, "/tasks", Some(&cookie)).await;
    let html = body_string(response).await;
    assert!(!html.contains("Task created"));
    assert!(html.contains("Ship it"));
}

#[tokio::test]
async fn create_task_requires_a_title() {
    let app = test_app().await;
    let cookie = login(&app, "alice", "alice").await;

    let response = get(&app, "/tasks/create", Some(&cookie)).await;
    let cookie = session_cookie(&response).unwrap_or(cookie);
    let csrf = extract_csrf(&body_string(response).await);

    let response = post_form(&app, "/tasks/create", Some(&cookie), &format!("_csrf={csrf}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Title is required"));
}

#[tokio::test]
async fn edit_and_update_a_task() {
    let app = test_app().await;
    let cookie = login(&app, "alice", "alice").await;

    let response = get(&app, "/tasks/1/edit", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).unwrap_or(cookie);
    let html = body_string(response).await;
    assert!(html.contains("Sample Task 1"));
    let csrf = extract_csrf(&html);

    let form = format!("title=Renamed&status=done&_csrf={csrf}");
    let response = post_form(&app, "/tasks/1/update", Some(&cookie), &form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response).unwrap_or(cookie);

    let response = get(&app, "/tasks", Some(&cookie)).await;
    let html = body_string(response).await;
    assert!(html.contains("Renamed"));
    assert!(html.contains("done"));
}

#[tokio::test]
async fn editing_an_unknown_task_redirects_to_the_list() {
    let app = test_app().await;
    let cookie = login(&app, "alice", "alice").await;

    let response = get(&app, "/tasks/99/edit", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/tasks");
}

#[tokio::test]
async fn delete_a_task_from_the_list() {
    let app = test_app().await;
    let cookie = login(&app, "alice", "alice").await;

    let response = get(&app, "/tasks", Some(&cookie)).await;
    let cookie = session_cookie(&response).unwrap_or(cookie);
    let csrf = extract_csrf(&body_string(response).await);

    let response = post_form(
        &app,
        "/tasks/1/delete",
        Some(&cookie),
        &format!("_csrf={csrf}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response).unwrap_or(cookie);

    let response = get(&app, "/tasks", Some(&cookie)).await;
    let html = body_string(response).await;
    assert!(!html.contains("Sample Task 1"));
    assert!(html.contains("Sample Task 2"));
}

#[tokio::test]
async fn mutating_forms_reject_bad_csrf_tokens() {
    let app = test_app().await;
    let cookie = login(&app, "alice", "alice").await;

    let response = post_form(
        &app,
        "/tasks/create",
        Some(&cookie),
        "title=Nope&_csrf=wrong",
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_form(&app, "/tasks/1/delete", Some(&cookie), "_csrf=wrong").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_pages_render_the_error_template() {
    let app = test_app().await;
    let response = get(&app, "/definitely-not-a-page", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_string(response).await;
    assert!(html.contains("Error 404"));
}
