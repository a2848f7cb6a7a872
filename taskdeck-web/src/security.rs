//! CSRF protection for server-rendered forms
//!
//! A per-session token is minted by the session middleware, embedded in
//! every form, and checked by the form handlers. The JSON API under
//! `/api/` is exempt.

use crate::session::Session;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use tracing::warn;

const CSRF_TOKEN_LEN: usize = 32;

/// Form body for posts that carry nothing but the CSRF token
/// (logout, delete buttons).
#[derive(Debug, Deserialize)]
pub struct ConfirmForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

/// Mint a fresh CSRF token.
pub fn generate_csrf_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CSRF_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Check a submitted form token against the session's token.
pub fn verify_csrf(session: &Session, submitted: &str) -> bool {
    match session.csrf_token() {
        Some(expected) => !submitted.is_empty() && expected == submitted,
        None => false,
    }
}

/// The response for a form post with a missing or wrong token.
pub fn csrf_rejection() -> Response {
    warn!("rejecting form submission with invalid CSRF token");
    (StatusCode::FORBIDDEN, "Invalid CSRF token").into_response()
}
