//! Concurrent session registry
//!
//! One session per registered extension identity, guarded by a single
//! read/write lock: lookups proceed in parallel with each other, mutation is
//! exclusive. The registry is a plain service object constructed once at
//! startup; tests build their own fresh instance.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use crate::error::AuthError;
use crate::models::{ExtensionIdentity, Session};

/// Default maximum number of simultaneously registered extensions
pub const MAX_EXTENSIONS: usize = 10_000;

/// Default idle threshold after which sessions are swept
pub const SESSION_IDLE_EXPIRY_DAYS: i64 = 7;

/// Concurrent store of extension sessions keyed by identity string
pub struct SessionRegistry {
    max_extensions: usize,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    /// Create a registry with the given size cap
    pub fn new(max_extensions: usize) -> Self {
        Self {
            max_extensions,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the default cap
    pub fn with_defaults() -> Self {
        Self::new(MAX_EXTENSIONS)
    }

    /// Insert or replace the session for `identity`, registered at `now`
    ///
    /// Registering an already-known identity replaces its session. Fails
    /// closed with `RegistryFull` at the size cap; the cap is checked before
    /// insertion rather than atomically with it, which is acceptable for a
    /// soft abuse guard.
    pub fn register(
        &self,
        identity: ExtensionIdentity,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let extension_id = identity.extension_id.clone();

        {
            let sessions = self.sessions.read().unwrap();
            if !sessions.contains_key(&extension_id) && sessions.len() >= self.max_extensions {
                return Err(AuthError::RegistryFull);
            }
        }

        let session = Session::new(identity, token, now);
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(extension_id, session);
        Ok(())
    }

    /// Snapshot of the session for `extension_id`, if registered
    pub fn get(&self, extension_id: &str) -> Option<Session> {
        let sessions = self.sessions.read().unwrap();
        sessions.get(extension_id).cloned()
    }

    /// Record an admitted request: bump `last_activity` and `request_count`
    ///
    /// No-op when the identity is not registered.
    pub fn touch_activity(&self, extension_id: &str, now: DateTime<Utc>) {
        let mut sessions = self.sessions.write().unwrap();
        if let Some(session) = sessions.get_mut(extension_id) {
            session.last_activity = now;
            session.request_count += 1;
        }
    }

    /// Remove every session idle for longer than `idle_threshold`
    ///
    /// Returns the evicted identities so the caller can emit audit events.
    pub fn sweep_expired(&self, now: DateTime<Utc>, idle_threshold: Duration) -> Vec<String> {
        let mut sessions = self.sessions.write().unwrap();
        let mut removed = Vec::new();

        sessions.retain(|extension_id, session| {
            if now - session.last_activity > idle_threshold {
                removed.push(extension_id.clone());
                false
            } else {
                true
            }
        });

        removed
    }

    /// Current number of registered sessions
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Whether the registry holds no sessions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
