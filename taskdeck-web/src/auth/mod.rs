//! Authentication and authorization extractors
//!
//! The two request preconditions are axum extractors: [`CurrentUser`]
//! redirects unauthenticated visitors to the login page (remembering
//! where they were headed), and [`AdminUser`] additionally rejects
//! non-admin users with a terminal 403. The session middleware always
//! runs first, so by the time either extractor looks at the session the
//! lifecycle guard has already purged stale identities.

pub mod database;
pub mod handlers;
pub mod users;

use crate::session::Session;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use taskdeck_core::{Identity, Role};
use tracing::warn;

/// Authentication errors surfaced by the credential store.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing credentials")]
    MissingCredentials,
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Password hashing failed")]
    PasswordHash,
    #[error("Database error: {0}")]
    Database(String),
}

/// Redirect-to-login for unauthenticated requests.
///
/// A control-flow result, not an error: the visitor is sent to the login
/// page and the originally requested URL has already been recorded in the
/// session by the extractor.
#[derive(Debug)]
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

/// Terminal rejection for authenticated but under-privileged requests.
#[derive(Debug)]
pub struct Forbidden;

impl IntoResponse for Forbidden {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, "Forbidden").into_response()
    }
}

/// Extractor for routes that require an authenticated visitor.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match session.identity() {
            Some(identity) => Ok(CurrentUser(identity)),
            None => {
                // Remember the originally requested URL so the login
                // handler can send the visitor back afterwards.
                let wanted = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| parts.uri.path().to_string());
                session.update(|data| data.return_to = Some(wanted));
                Err(AuthRedirect.into_response())
            }
        }
    }
}

/// Extractor for routes that require an administrator.
///
/// Unauthenticated visitors get the login redirect; authenticated
/// non-admins get a 403, never a redirect.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;

        match identity.role {
            Role::Admin => Ok(AdminUser(identity)),
            Role::Normal => {
                warn!(
                    "admin access required but user '{}' is not admin",
                    identity.username
                );
                Err(Forbidden.into_response())
            }
        }
    }
}
