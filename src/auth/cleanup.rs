//! Background session cleanup
//!
//! A periodic task that sweeps the session registry for idle sessions and
//! prunes quiet rate-limiter windows. Owned by the process lifecycle: started
//! at startup, stopped through a shutdown broadcast, never blocking request
//! handlers beyond the registry lock held for a single sweep.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{debug, info};

use super::gate::AuthGate;
use super::registry::SESSION_IDLE_EXPIRY_DAYS;

/// Default sweep interval in seconds (1 hour)
pub const CLEANUP_INTERVAL_SECS: u64 = 3600;

/// Configuration for the cleanup scheduler
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Time between sweeps
    pub interval: StdDuration,

    /// Idle duration after which a session is evicted
    pub idle_threshold: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval: StdDuration::from_secs(CLEANUP_INTERVAL_SECS),
            idle_threshold: Duration::days(SESSION_IDLE_EXPIRY_DAYS),
        }
    }
}

/// Periodic sweeper over the authentication gate's state
pub struct CleanupScheduler {
    config: CleanupConfig,
    gate: Arc<AuthGate>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl CleanupScheduler {
    /// Create a new scheduler
    ///
    /// # Arguments
    ///
    /// * `config` - Sweep interval and idle threshold
    /// * `gate` - The gate whose registry and rate limiter are swept
    /// * `shutdown_rx` - Broadcast receiver for the shutdown signal
    pub fn new(
        config: CleanupConfig,
        gate: Arc<AuthGate>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            config,
            gate,
            shutdown_rx,
        }
    }

    /// Run the scheduler until shutdown is signaled
    ///
    /// Each tick performs exactly one sweep. An in-flight sweep finishes
    /// before shutdown completes because the sweep is synchronous.
    pub async fn run(mut self) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            idle_threshold_days = self.config.idle_threshold.num_days(),
            "Starting cleanup scheduler"
        );

        let mut ticker = interval(self.config.interval);
        // The first tick of tokio's interval fires immediately; consume it so
        // sweeps start one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.gate.sweep(self.config.idle_threshold);
                    debug!(
                        sessions_removed = removed,
                        sessions_remaining = self.gate.session_count(),
                        "Cleanup sweep complete"
                    );
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Cleanup scheduler shutting down");
                    break;
                }
            }
        }
    }
}
