//! Server-side session record
//!
//! One session exists per registered extension identity. Sessions are owned
//! and mutated exclusively by the session registry; handlers only ever see
//! snapshots.

use chrono::{DateTime, Utc};

use super::identity::ExtensionIdentity;

/// State of a registered extension
#[derive(Debug, Clone)]
pub struct Session {
    /// The identity registered for this session
    pub identity: ExtensionIdentity,

    /// Bearer token presented at registration time
    pub token: String,

    /// When the session was registered
    pub register_time: DateTime<Utc>,

    /// Last admitted request; always >= `register_time`
    pub last_activity: DateTime<Utc>,

    /// Admitted requests over the session lifetime; only increases
    pub request_count: i64,

    /// Cleared when the session is logically deleted
    pub is_active: bool,
}

impl Session {
    /// Create a fresh session registered at `now`
    pub fn new(identity: ExtensionIdentity, token: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            token: token.into(),
            register_time: now,
            last_activity: now,
            request_count: 0,
            is_active: true,
        }
    }

    /// Seconds the session has existed, relative to `now`
    pub fn uptime_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.register_time).num_seconds()
    }
}
