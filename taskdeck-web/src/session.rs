//! Signed session cookie codec and the per-request session handle
//!
//! The whole session lives client-side in one signed cookie; the server
//! keeps nothing. Decoding fails open: a missing, malformed, expired, or
//! tampered cookie yields an empty session, never an error to the caller.

use crate::{WebError, WebResult};
use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use taskdeck_core::{Flash, Identity, SessionData};
use tracing::debug;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "taskdeck_session";

/// How long a signed session token stays valid.
const SESSION_TTL_HOURS: i64 = 24;

/// Signed claims wrapping the session payload.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    data: SessionData,
    /// Issued at (timestamp)
    iat: i64,
    /// Expiration time (timestamp)
    exp: i64,
}

/// Session signing and verification keys.
///
/// The first configured key signs new tokens; every configured key is
/// tried during verification, so keys can be rotated without invalidating
/// all sessions at once.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: Vec<DecodingKey>,
}

impl SessionKeys {
    pub fn new(secrets: &[String]) -> WebResult<Self> {
        let primary = secrets
            .first()
            .ok_or_else(|| WebError::Config("at least one session key is required".to_string()))?;

        Ok(Self {
            encoding: EncodingKey::from_secret(primary.as_bytes()),
            decoding: secrets
                .iter()
                .map(|secret| DecodingKey::from_secret(secret.as_bytes()))
                .collect(),
        })
    }

    /// Sign a session into a cookie value using the primary key.
    pub fn encode(&self, data: &SessionData) -> WebResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            data: data.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| WebError::Session(format!("failed to sign session token: {err}")))
    }

    /// Verify and decode a cookie value against every configured key.
    ///
    /// Fails open: any verification or decode failure is logged and the
    /// visitor continues with an empty (logged-out) session.
    pub fn decode(&self, token: &str) -> SessionData {
        let validation = Validation::default();
        let mut last_error = None;

        for key in &self.decoding {
            match decode::<SessionClaims>(token, key, &validation) {
                Ok(verified) => return verified.claims.data,
                Err(err) => last_error = Some(err),
            }
        }

        if let Some(err) = last_error {
            debug!("session token rejected, starting empty session: {}", err);
        }
        SessionData::default()
    }
}

/// Per-request handle to the mutable session state.
///
/// The session middleware decodes the cookie into this handle before the
/// handler runs and writes the cookie back afterwards iff the state
/// changed; handlers and extractors mutate the session through it.
#[derive(Clone)]
pub struct Session(Arc<Mutex<SessionData>>);

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self(Arc::new(Mutex::new(data)))
    }

    /// Snapshot of the current session state.
    pub fn get(&self) -> SessionData {
        self.0.lock().unwrap().clone()
    }

    /// Mutate the session state in place.
    pub fn update<F: FnOnce(&mut SessionData)>(&self, mutate: F) {
        mutate(&mut self.0.lock().unwrap());
    }

    pub fn identity(&self) -> Option<Identity> {
        self.0.lock().unwrap().identity.clone()
    }

    /// Return-and-clear the pending flash message.
    pub fn take_flash(&self) -> Option<Flash> {
        self.0.lock().unwrap().take_flash()
    }

    /// Return-and-clear the remembered post-login destination.
    pub fn take_return_to(&self) -> Option<String> {
        self.0.lock().unwrap().take_return_to()
    }

    pub fn set_flash(&self, flash: Flash) {
        self.0.lock().unwrap().flash = Some(flash);
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.0.lock().unwrap().csrf.clone()
    }

    /// The session's CSRF token, minting one on first use.
    ///
    /// Called by handlers that render forms; verification never mints, so
    /// the JSON API stays cookie-free.
    pub fn ensure_csrf(&self) -> String {
        let mut data = self.0.lock().unwrap();
        match &data.csrf {
            Some(token) => token.clone(),
            None => {
                let token = crate::security::generate_csrf_token();
                data.csrf = Some(token.clone());
                token
            }
        }
    }

    /// Discard the whole session; the middleware turns this into a cookie
    /// removal on the response.
    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Inserted by the session middleware; absence is a wiring bug.
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
