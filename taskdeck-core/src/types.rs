//! Core domain types shared across the Taskdeck crates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role, a closed enumeration.
///
/// Role checks match exhaustively on this enum; there is no way for an
/// unrecognized role value to pass or fail a check silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Normal,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Normal => "normal",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Role::Normal),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Error returned when a stored role value is not part of the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

/// The authenticated user captured in a session.
///
/// Present only after a successful credential check; absent means the
/// visitor is unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
    pub user_id: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role, user_id: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role,
            user_id: user_id.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("normal".parse::<Role>().unwrap(), Role::Normal);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("superuser".to_string()));
    }

    #[test]
    fn identity_admin_check_is_exhaustive() {
        let alice = Identity::new("alice", Role::Normal, "u-1");
        let bob = Identity::new("bob", Role::Admin, "u-2");
        assert!(!alice.is_admin());
        assert!(bob.is_admin());
    }
}
