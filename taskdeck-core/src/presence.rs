//! Online-presence tracking
//!
//! A process-wide map of username to last-seen timestamp, refreshed on
//! every authenticated request. The tracker is an explicitly owned
//! component: construct one at process start and hand clones to whatever
//! needs it, so tests get a fresh instance each.
//!
//! Entries are not expired by time; only logout or account deletion
//! removes them, so a user whose browser simply went away stays "online".

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// One row of the admin presence listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub username: String,
    pub online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Process-wide last-seen bookkeeping.
///
/// All operations are single-key upserts or removals; there is no
/// cross-key invariant, so one lock over the map suffices and is never
/// held across an await point.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    seen: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `username` was just seen. Last-seen values never move
    /// backwards, even if the wall clock does.
    pub fn refresh(&self, username: &str) {
        let now = Utc::now();
        let mut seen = self.seen.write().unwrap();
        let at = seen.entry(username.to_string()).or_insert(now);
        if now > *at {
            *at = now;
        }
    }

    /// Drop the entry for `username` (logout or account deletion).
    pub fn mark_offline(&self, username: &str) {
        if self.seen.write().unwrap().remove(username).is_some() {
            debug!("presence entry removed for {}", username);
        }
    }

    /// Last-seen timestamp for `username`, if any.
    pub fn last_seen(&self, username: &str) -> Option<DateTime<Utc>> {
        self.seen.read().unwrap().get(username).copied()
    }

    /// Join a user list against the presence map, ordered by username.
    ///
    /// `online` is true iff an entry exists; a user can appear offline
    /// here while still holding a perfectly valid session cookie.
    pub fn snapshot<I, S>(&self, usernames: I) -> Vec<PresenceEntry>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let seen = self.seen.read().unwrap();
        let mut entries: Vec<PresenceEntry> = usernames
            .into_iter()
            .map(|username| {
                let username = username.into();
                let last_seen_at = seen.get(&username).copied();
                PresenceEntry {
                    online: last_seen_at.is_some(),
                    username,
                    last_seen_at,
                }
            })
            .collect();
        entries.sort_by(|a, b| a.username.cmp(&b.username));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_is_monotonic() {
        let tracker = PresenceTracker::new();
        tracker.refresh("alice");
        let first = tracker.last_seen("alice").unwrap();
        tracker.refresh("alice");
        let second = tracker.last_seen("alice").unwrap();
        assert!(second >= first);
    }

    #[test]
    fn mark_offline_removes_only_that_user() {
        let tracker = PresenceTracker::new();
        tracker.refresh("alice");
        tracker.refresh("bob");
        tracker.mark_offline("alice");
        assert!(tracker.last_seen("alice").is_none());
        assert!(tracker.last_seen("bob").is_some());
    }

    #[test]
    fn snapshot_joins_known_users_in_order() {
        let tracker = PresenceTracker::new();
        tracker.refresh("carol");

        let entries = tracker.snapshot(["carol", "alice"]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].username, "alice");
        assert!(!entries[0].online);
        assert!(entries[0].last_seen_at.is_none());
        assert_eq!(entries[1].username, "carol");
        assert!(entries[1].online);
        assert!(entries[1].last_seen_at.is_some());
    }

    #[test]
    fn offline_user_still_listed() {
        let tracker = PresenceTracker::new();
        tracker.refresh("alice");
        tracker.mark_offline("alice");

        let entries = tracker.snapshot(["alice"]);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].online);
    }
}
