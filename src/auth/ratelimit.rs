//! Per-identity sliding-window rate limiter
//!
//! Tracks the timestamps of admitted requests per extension identity over a
//! trailing window. Entries older than the window are pruned lazily on every
//! check, bounding memory to at most the per-window cap for each identity
//! that keeps making requests.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

/// Default number of requests admitted per window
pub const MAX_REQUESTS_PER_MIN: usize = 120;

/// Configuration for the rate limiter
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum admitted requests inside one window
    pub max_per_window: usize,

    /// Width of the sliding window
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: MAX_REQUESTS_PER_MIN,
            window: Duration::minutes(1),
        }
    }
}

/// Sliding-window rate limiter keyed by extension identity
///
/// Thread-safe; calls for the same identity serialize on the map lock,
/// different identities only contend on that same lock.
pub struct RateLimiter {
    config: RateLimitConfig,
    requests: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            requests: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new rate limiter with default configuration
    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default())
    }

    /// Admit or reject a request for `extension_id` occurring at `now`
    ///
    /// Prunes entries at or before `now - window`, rejects when the remaining
    /// count has reached the cap, and records `now` only on admission. A
    /// rejected request therefore neither consumes quota nor extends the
    /// window.
    pub fn admit(&self, extension_id: &str, now: DateTime<Utc>) -> bool {
        let mut requests = self.requests.write().unwrap();
        let cutoff = now - self.config.window;

        let window = requests.entry(extension_id.to_string()).or_default();
        window.retain(|&ts| ts > cutoff);

        if window.len() >= self.config.max_per_window {
            return false;
        }

        window.push(now);
        true
    }

    /// Number of requests currently inside the window for `extension_id`
    pub fn window_len(&self, extension_id: &str, now: DateTime<Utc>) -> usize {
        let requests = self.requests.read().unwrap();
        let cutoff = now - self.config.window;

        requests
            .get(extension_id)
            .map(|window| window.iter().filter(|&&ts| ts > cutoff).count())
            .unwrap_or(0)
    }

    /// Drop identities whose windows have fully emptied
    ///
    /// Lazy pruning only runs for identities that keep calling; this sweep
    /// reclaims the entries of identities that went quiet. Called
    /// periodically by the cleanup scheduler.
    pub fn cleanup(&self, now: DateTime<Utc>) {
        let mut requests = self.requests.write().unwrap();
        let cutoff = now - self.config.window;

        requests.retain(|_, window| {
            window.retain(|&ts| ts > cutoff);
            !window.is_empty()
        });
    }

    /// Current number of tracked identities
    pub fn tracked_identities_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }
}
