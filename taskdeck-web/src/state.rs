//! Application state wiring

use crate::{
    auth::{database::DatabaseUserStore, users::UserStore},
    session::SessionKeys,
    tasks::{database::DatabaseTaskStore, TaskStore},
    WebConfig, WebError, WebResult,
};
use std::sync::Arc;
use taskdeck_core::{PresenceTracker, ServerEpoch};
use tracing::{error, info, warn};

/// Shared application state.
///
/// The presence tracker and the server epoch are owned here explicitly:
/// one instance each per process, handed to whatever needs them, so tests
/// can build isolated states at will.
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// Identifies this process instance; sessions from other epochs are stale
    pub epoch: ServerEpoch,
    /// Session cookie signing/verification keys
    pub session_keys: Arc<SessionKeys>,
    /// Online-presence bookkeeping
    pub presence: PresenceTracker,
    /// Credential store
    pub user_store: UserStore,
    /// Task repository
    pub task_store: TaskStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Tries the configured database first; if it is unreachable the
    /// stores fall back to memory and the server keeps working in
    /// degraded mode.
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let session_keys = Arc::new(SessionKeys::new(&config.session_keys)?);

        let (user_store, task_store) = match &config.database_url {
            Some(url) => match Self::connect_stores(url).await {
                Ok(stores) => {
                    info!("✅ database connected");
                    stores
                }
                Err(err) => {
                    warn!("❌ database unavailable, using in-memory stores: {err}");
                    (UserStore::memory(), TaskStore::memory())
                }
            },
            None => {
                info!("no database configured, using in-memory stores");
                (UserStore::memory(), TaskStore::memory())
            }
        };

        // Bootstrap provisioning: the configured admin and the demo user.
        if let Err(err) = user_store.ensure_admin(&config.admin_username).await {
            error!("admin bootstrap failed: {err}");
        }

        Ok(Self {
            epoch: ServerEpoch::mint(),
            session_keys,
            presence: PresenceTracker::new(),
            user_store,
            task_store,
            config,
        })
    }

    async fn connect_stores(url: &str) -> WebResult<(UserStore, TaskStore)> {
        let users = DatabaseUserStore::new(url)
            .await
            .map_err(|e| WebError::Database(e.to_string()))?;
        let tasks = DatabaseTaskStore::new(users.pool().clone()).await?;
        Ok((UserStore::Database(users), TaskStore::Database(tasks)))
    }
}
