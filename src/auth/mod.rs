//! Authentication system for extension-gate
//!
//! This module provides the authentication core:
//! - Token signing and validation
//! - Concurrent session registry with TTL eviction
//! - Per-identity sliding-window rate limiting
//! - The gate that composes them, and its background cleanup task

pub mod cleanup;
pub mod gate;
pub mod ratelimit;
pub mod registry;
pub mod token;

pub use cleanup::{CleanupConfig, CleanupScheduler, CLEANUP_INTERVAL_SECS};
pub use gate::{AuthGate, AuthHeaders, GateConfig};
pub use ratelimit::{RateLimitConfig, RateLimiter, MAX_REQUESTS_PER_MIN};
pub use registry::{SessionRegistry, MAX_EXTENSIONS, SESSION_IDLE_EXPIRY_DAYS};
pub use token::{
    generate_token_signature, mint_token, validate_token_format, TOKEN_EXPIRY_HOURS,
};
