//! Session data contract and the server-epoch lifecycle guard
//!
//! A session is client-held state, signed into a cookie by the web layer.
//! It is never persisted on the server, so the only way to invalidate
//! sessions after a restart is the epoch check implemented here.

use crate::types::Identity;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Kind of a one-shot flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl std::fmt::Display for FlashKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        })
    }
}

/// A one-shot notification rendered by the next page view only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// The session payload carried in the signed cookie.
///
/// `flash` and `return_to` are one-shot fields: read them through the
/// `take_*` operations, which clear them atomically so a handler reading
/// twice cannot consume the same value twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_epoch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf: Option<String>,
}

impl SessionData {
    /// A session with no fields set. Writing an empty session back to the
    /// client removes the cookie entirely.
    pub fn is_empty(&self) -> bool {
        self.identity.is_none()
            && self.return_to.is_none()
            && self.flash.is_none()
            && self.server_epoch.is_none()
            && self.csrf.is_none()
    }

    /// Return-and-clear the pending flash message.
    pub fn take_flash(&mut self) -> Option<Flash> {
        self.flash.take()
    }

    /// Return-and-clear the remembered post-login destination.
    pub fn take_return_to(&mut self) -> Option<String> {
        self.return_to.take()
    }

    /// Discard everything, equivalent to logout.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Record the given epoch as the one that validated this session.
    pub fn stamp(&mut self, epoch: &ServerEpoch) {
        self.server_epoch = Some(epoch.as_str().to_string());
    }
}

/// A value unique to one run of the server process.
///
/// Minted once at startup and constant for the process lifetime; sessions
/// carry the epoch that last validated them so a restart can be detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEpoch(String);

impl ServerEpoch {
    /// Mint the epoch for this process.
    pub fn mint() -> Self {
        Self(Utc::now().timestamp_millis().to_string())
    }

    /// Build an epoch from a fixed value (restart simulation in tests,
    /// epoch pinning in tools).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the lifecycle guard decided for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochOutcome {
    /// Session already belongs to this process instance.
    Unchanged,
    /// Authenticated session from a previous instance: discard it all.
    Cleared,
    /// Anonymous session converged to the current epoch in place.
    Stamped,
}

/// The lifecycle guard, as a pure decision.
///
/// The caller applies the outcome (`clear` / `stamp`) and persists the
/// session; keeping the decision side-effect-free lets decode failures be
/// logged where they happen instead of being swallowed inside the guard.
///
/// Authenticated sessions from another epoch are cleared; anonymous ones
/// are stamped in place so anonymous browsing never loops through
/// repeated cookie resets. That asymmetry is deliberate.
pub fn reconcile_epoch(session: &SessionData, current: &ServerEpoch) -> EpochOutcome {
    let stale = session.server_epoch.as_deref() != Some(current.as_str());
    match (stale, &session.identity) {
        (false, _) => EpochOutcome::Unchanged,
        (true, Some(_)) => EpochOutcome::Cleared,
        (true, None) => EpochOutcome::Stamped,
    }
}
