//! User records and the credential store

use super::{database::DatabaseUserStore, AuthError};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use taskdeck_core::{Identity, Role};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Stored user data with password hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new user with a hashed password.
    pub fn new(username: impl Into<String>, password: &str, role: Role) -> Result<Self, AuthError> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            password_hash: hash_password(password)?,
            role,
            created_at: Utc::now(),
        })
    }

    /// Verify a candidate password against the stored hash.
    pub fn verify_password(&self, candidate: &str) -> bool {
        verify_password(candidate, &self.password_hash).unwrap_or(false)
    }

    /// The session identity for this user.
    pub fn identity(&self) -> Identity {
        Identity::new(self.username.clone(), self.role, self.id.clone())
    }
}

/// Credential store supporting both in-memory and database storage.
///
/// The in-memory variant doubles as the fallback when the database is
/// unreachable and as the test backend.
#[derive(Debug, Clone)]
pub enum UserStore {
    Memory {
        users: Arc<RwLock<HashMap<String, UserRecord>>>,
    },
    Database(DatabaseUserStore),
}

impl Default for UserStore {
    fn default() -> Self {
        Self::memory()
    }
}

impl UserStore {
    /// Create an in-memory user store.
    pub fn memory() -> Self {
        Self::Memory {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Look up a user by username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
        match self {
            Self::Memory { users } => Ok(users.read().unwrap().get(username).cloned()),
            Self::Database(db) => db.find_by_username(username).await,
        }
    }

    /// Look up a user by id.
    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, AuthError> {
        match self {
            Self::Memory { users } => Ok(users
                .read()
                .unwrap()
                .values()
                .find(|user| user.id == user_id)
                .cloned()),
            Self::Database(db) => db.find_by_id(user_id).await,
        }
    }

    /// All users, for the admin listing.
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, AuthError> {
        match self {
            Self::Memory { users } => {
                let mut all: Vec<UserRecord> = users.read().unwrap().values().cloned().collect();
                all.sort_by(|a, b| a.username.cmp(&b.username));
                Ok(all)
            }
            Self::Database(db) => db.list_users().await,
        }
    }

    /// Register a new user; usernames are unique.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<UserRecord, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            debug!("registration rejected: missing credentials");
            return Err(AuthError::MissingCredentials);
        }
        if password.len() < 6 {
            debug!("registration rejected: password too short");
            return Err(AuthError::InvalidCredentials);
        }

        let record = self
            .insert_record(UserRecord::new(username.trim(), password, role)?)
            .await?;
        info!("registered new user: {}", record.username);
        Ok(record)
    }

    /// Insert a record without form-level validation (bootstrap path).
    async fn insert_record(&self, record: UserRecord) -> Result<UserRecord, AuthError> {
        match self {
            Self::Memory { users } => {
                let mut users = users.write().unwrap();
                if users.contains_key(&record.username) {
                    debug!("insert rejected: username '{}' exists", record.username);
                    return Err(AuthError::UsernameTaken);
                }
                users.insert(record.username.clone(), record.clone());
                Ok(record)
            }
            Self::Database(db) => {
                if db.find_by_username(&record.username).await?.is_some() {
                    debug!("insert rejected: username '{}' exists", record.username);
                    return Err(AuthError::UsernameTaken);
                }
                db.insert_user(&record).await?;
                Ok(record)
            }
        }
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, AuthError> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.verify_password(password) {
            warn!("invalid password for user: {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        debug!("user authenticated: {}", username);
        Ok(user)
    }

    /// Remove a user by id, returning the removed record.
    pub async fn delete_user(&self, user_id: &str) -> Result<Option<UserRecord>, AuthError> {
        match self {
            Self::Memory { users } => {
                let mut users = users.write().unwrap();
                let username = users
                    .values()
                    .find(|user| user.id == user_id)
                    .map(|user| user.username.clone());
                Ok(username.and_then(|name| users.remove(&name)))
            }
            Self::Database(db) => db.delete_user(user_id).await,
        }
    }

    /// Promote an existing user to admin, or create the account if absent.
    async fn ensure_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<(), AuthError> {
        match self.find_by_username(username).await? {
            Some(existing) if role == Role::Admin && existing.role != Role::Admin => {
                self.promote_to_admin(&existing).await?;
                info!("promoted '{}' to admin", username);
            }
            Some(_) => debug!("bootstrap user '{}' already exists", username),
            None => {
                self.insert_record(UserRecord::new(username, password, role)?)
                    .await?;
                info!("created bootstrap user '{}' ({})", username, role);
            }
        }
        Ok(())
    }

    async fn promote_to_admin(&self, user: &UserRecord) -> Result<(), AuthError> {
        match self {
            Self::Memory { users } => {
                if let Some(record) = users.write().unwrap().get_mut(&user.username) {
                    record.role = Role::Admin;
                }
                Ok(())
            }
            Self::Database(db) => db.set_role(&user.id, Role::Admin).await,
        }
    }

    /// Startup provisioning: make sure the configured administrator exists
    /// with the admin role, and seed the demo user `alice`.
    ///
    /// Bootstrap passwords default to the username; change them after
    /// first login.
    pub async fn ensure_admin(&self, admin_username: &str) -> Result<(), AuthError> {
        if admin_username.is_empty() {
            return Ok(());
        }
        self.ensure_user(admin_username, admin_username, Role::Admin)
            .await?;
        self.ensure_user("alice", "alice", Role::Normal).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_and_authenticate() {
        let store = UserStore::memory();
        store
            .register("alice", "password123", Role::Normal)
            .await
            .unwrap();

        let user = store.authenticate("alice", "password123").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::Normal);

        let err = store.authenticate("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let store = UserStore::memory();
        store
            .register("alice", "password123", Role::Normal)
            .await
            .unwrap();
        let err = store
            .register("alice", "different", Role::Normal)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn short_passwords_are_rejected() {
        let store = UserStore::memory();
        let err = store.register("bob", "four", Role::Normal).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn ensure_admin_creates_and_promotes() {
        let store = UserStore::memory();
        store
            .register("root", "password123", Role::Normal)
            .await
            .unwrap();

        store.ensure_admin("root").await.unwrap();

        let root = store.find_by_username("root").await.unwrap().unwrap();
        assert_eq!(root.role, Role::Admin);

        // The demo user is seeded alongside.
        let alice = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.role, Role::Normal);

        // Running again is a no-op.
        store.ensure_admin("root").await.unwrap();
        assert_eq!(store.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_user_returns_removed_record() {
        let store = UserStore::memory();
        let user = store
            .register("carol", "password123", Role::Normal)
            .await
            .unwrap();

        let removed = store.delete_user(&user.id).await.unwrap().unwrap();
        assert_eq!(removed.username, "carol");
        assert!(store.find_by_username("carol").await.unwrap().is_none());
        assert!(store.delete_user(&user.id).await.unwrap().is_none());
    }
}
