//! Handlers for login, registration, and logout

use super::AuthError;
use crate::{
    security::{self, ConfirmForm},
    session::Session,
    templates::{render, LoginTemplate, RegisterTemplate},
    AppState,
};
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use taskdeck_core::{Flash, Role};
use tracing::{debug, error, info};

/// Where a successful login lands when no return-to was recorded.
const DEFAULT_LANDING: &str = "/tasks";

/// Login form body
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

/// Registration form body
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

fn csrf(session: &Session) -> String {
    session.ensure_csrf()
}

/// Render the login page.
pub async fn login_page(session: Session) -> Response {
    let flash = session.take_flash();
    render(LoginTemplate::new(None, flash, csrf(&session)))
}

/// Handle a login form submission.
///
/// On success the identity is written into the session, the remembered
/// destination is consumed exactly once, and the visitor is redirected
/// there (or to the task list).
pub async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if !security::verify_csrf(&session, &form.csrf) {
        return security::csrf_rejection();
    }

    info!("login attempt: {}", form.username);

    match state
        .user_store
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            let destination = session
                .take_return_to()
                .unwrap_or_else(|| DEFAULT_LANDING.to_string());
            session.update(|data| {
                data.identity = Some(user.identity());
                data.stamp(&state.epoch);
            });
            info!("user logged in: {}", user.username);
            Redirect::to(&destination).into_response()
        }
        Err(AuthError::Database(err)) => {
            error!("login failed against credential store: {}", err);
            render(LoginTemplate::new(
                Some("An error occurred".to_string()),
                None,
                csrf(&session),
            ))
        }
        Err(err) => {
            debug!("login rejected for {}: {}", form.username, err);
            render(LoginTemplate::new(
                Some("Invalid credentials".to_string()),
                None,
                csrf(&session),
            ))
        }
    }
}

/// Render the registration page.
pub async fn register_page(session: Session) -> Response {
    render(RegisterTemplate::new(None, csrf(&session)))
}

/// Handle a registration form submission. New accounts are always normal
/// users; admins come from bootstrap provisioning only.
pub async fn register_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if !security::verify_csrf(&session, &form.csrf) {
        return security::csrf_rejection();
    }

    info!("registration attempt: {}", form.username);

    match state
        .user_store
        .register(&form.username, &form.password, Role::Normal)
        .await
    {
        Ok(user) => {
            info!("user registered: {}", user.username);
            session.set_flash(Flash::success("Account created. Please log in."));
            Redirect::to("/login").into_response()
        }
        Err(err) => {
            let message = match err {
                AuthError::UsernameTaken => "Username is already taken",
                AuthError::MissingCredentials => "Username and password are required",
                AuthError::InvalidCredentials => "Password must be at least 6 characters",
                AuthError::PasswordHash | AuthError::Database(_) => {
                    error!("registration failed: {}", err);
                    "An error occurred"
                }
            };
            render(RegisterTemplate::new(
                Some(message.to_string()),
                csrf(&session),
            ))
        }
    }
}

/// Log out: drop the presence entry, discard the session (which removes
/// the cookie), and go home.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ConfirmForm>,
) -> Response {
    if !security::verify_csrf(&session, &form.csrf) {
        return security::csrf_rejection();
    }

    if let Some(identity) = session.identity() {
        state.presence.mark_offline(&identity.username);
        info!("user logged out: {}", identity.username);
    }
    session.clear();
    Redirect::to("/").into_response()
}
