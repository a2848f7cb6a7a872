//! Taskdeck Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main Taskdeck web server
pub struct TaskdeckServer {
    config: WebConfig,
    state: AppState,
}

impl TaskdeckServer {
    /// Create a new Taskdeck server
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("🚀 Starting Taskdeck Web Server");
        info!("📍 Server address: http://{}", address);
        info!("🔧 Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for TaskdeckServer
pub struct TaskdeckServerBuilder {
    config: WebConfig,
}

impl TaskdeckServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: WebConfig::from_env(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = Some(database_url.into());
        self
    }

    /// Set the bootstrap admin username
    pub fn admin_username<S: Into<String>>(mut self, admin_username: S) -> Self {
        self.config.admin_username = admin_username.into();
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<TaskdeckServer> {
        TaskdeckServer::new(self.config).await
    }
}

impl Default for TaskdeckServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
