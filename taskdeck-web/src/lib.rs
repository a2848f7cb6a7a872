//! Taskdeck Web Server
//!
//! A session-based task management web application: server-rendered pages,
//! a JSON task API, and a role-gated admin area.

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod server;
pub mod session;
pub mod state;
pub mod tasks;
pub mod templates;

// Re-export main types
pub use server::TaskdeckServer;
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Server-rendered pages
        .merge(routes::page_routes())
        // Admin area
        .nest("/admin", routes::admin_routes())
        // JSON API
        .nest("/api", routes::api_routes())
        .fallback(handlers::pages::not_found)
        // Session decode, lifecycle guard, presence refresh, cookie write-back
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Database URL (optional; in-memory stores when absent or unreachable)
    pub database_url: Option<String>,
    /// Session signing keys; the first key signs, every key verifies
    pub session_keys: Vec<String>,
    /// Username provisioned as administrator at startup
    pub admin_username: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            dev_mode: false,
            database_url: None,
            session_keys: vec!["taskdeck-default-key-change-in-production".to_string()],
            admin_username: "admin".to_string(),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let session_keys = std::env::var("TASKDECK_SESSION_KEYS")
            .map(|raw| {
                raw.split(',')
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty())
                    .collect::<Vec<_>>()
            })
            .ok()
            .filter(|keys| !keys.is_empty())
            .unwrap_or(defaults.session_keys);

        Self {
            host: std::env::var("TASKDECK_HOST").unwrap_or(defaults.host),
            port: std::env::var("TASKDECK_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
            dev_mode: std::env::var("TASKDECK_DEV_MODE")
                .ok()
                .and_then(|flag| flag.parse().ok())
                .unwrap_or(defaults.dev_mode),
            database_url: std::env::var("DATABASE_URL").ok(),
            session_keys,
            admin_username: std::env::var("TASKDECK_ADMIN_USER").unwrap_or(defaults.admin_username),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server
pub fn init_logging() {
    taskdeck_core::init_logging("taskdeck_web=debug,tower_http=debug,axum=debug");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_a_signing_key() {
        let config = WebConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert!(!config.session_keys.is_empty());
        assert_eq!(config.admin_username, "admin");
    }

    #[test]
    fn address_joins_host_and_port() {
        let config = WebConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }
}
