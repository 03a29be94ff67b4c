//! Authentication gate
//!
//! The gate is the main authentication interface of the application. It owns
//! the session registry, the rate limiter, and the clock, and runs the
//! per-request decision pipeline: token validation, registration check, rate
//! limiting, activity bookkeeping. It is a pure gatekeeper and never produces
//! business responses.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::AuthError;
use crate::models::{RegisterRequest, Session};

use super::ratelimit::{RateLimitConfig, RateLimiter};
use super::registry::{SessionRegistry, MAX_EXTENSIONS};
use super::token::{validate_token_format, TOKEN_EXPIRY_HOURS};

/// Maximum token characters carried in audit events
const AUDIT_TOKEN_PREVIEW: usize = 20;

/// Configuration for the authentication gate
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Maximum accepted token age
    pub token_expiry: Duration,

    /// Rate limit configuration
    pub rate_limit: RateLimitConfig,

    /// Session registry size cap
    pub max_extensions: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            token_expiry: Duration::hours(TOKEN_EXPIRY_HOURS),
            rate_limit: RateLimitConfig::default(),
            max_extensions: MAX_EXTENSIONS,
        }
    }
}

/// Credential headers extracted from a request
///
/// All fields arrive over separate transport headers; absent headers are
/// empty strings, matching the wire behavior the extension client expects.
#[derive(Debug, Clone, Default)]
pub struct AuthHeaders {
    /// Bearer token (`X-Extension-Token`)
    pub token: String,

    /// Claimed identity (`X-Extension-ID`)
    pub extension_id: String,

    /// Extension version (`X-Extension-Version`), logged not validated
    pub extension_version: String,

    /// Client fingerprint (`X-Extension-Fingerprint`)
    pub fingerprint: String,

    /// Correlation id (`X-Request-ID`)
    pub request_id: String,
}

/// Authentication gate
///
/// Constructed once at startup and shared by the middleware and the cleanup
/// scheduler. All methods are safe for concurrent invocation.
pub struct AuthGate {
    config: GateConfig,
    registry: SessionRegistry,
    rate_limiter: RateLimiter,
    clock: Arc<dyn Clock>,
}

impl AuthGate {
    /// Create a new gate
    pub fn new(config: GateConfig, clock: Arc<dyn Clock>) -> Self {
        let registry = SessionRegistry::new(config.max_extensions);
        let rate_limiter = RateLimiter::new(config.rate_limit.clone());
        Self {
            config,
            registry,
            rate_limiter,
            clock,
        }
    }

    /// Current time as seen by the gate
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Run the full admission pipeline for one request
    ///
    /// Checks run fail-fast in a fixed order: credential presence, token
    /// format and signature, registration, rate limit. Only a fully admitted
    /// request updates session activity. Returns the validated extension ID.
    pub fn authenticate(
        &self,
        headers: &AuthHeaders,
        endpoint: &str,
        method: &str,
    ) -> Result<String, AuthError> {
        let now = self.clock.now();

        // Attempt is logged unconditionally, before any check can fail
        info!(
            event = "AUTH_ATTEMPT",
            extension_id = %headers.extension_id,
            extension_version = %headers.extension_version,
            fingerprint = %headers.fingerprint,
            request_id = %headers.request_id,
            endpoint = %endpoint,
            method = %method,
            timestamp = now.timestamp(),
            "Authentication attempt"
        );

        if headers.token.is_empty() || headers.extension_id.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        if !validate_token_format(
            &headers.token,
            &headers.extension_id,
            &headers.fingerprint,
            now,
            self.config.token_expiry,
        ) {
            warn!(
                event = "INVALID_TOKEN",
                extension_id = %headers.extension_id,
                token = %truncate_token(&headers.token),
                reason = "invalid_format_or_signature",
                "Token rejected"
            );
            return Err(AuthError::InvalidToken);
        }

        let session = self.registry.get(&headers.extension_id);
        let active = session.as_ref().map(|s| s.is_active).unwrap_or(false);
        if !active {
            warn!(
                event = "UNREGISTERED_EXTENSION",
                extension_id = %headers.extension_id,
                registered = session.is_some(),
                active = active,
                "Extension not registered or inactive"
            );
            return Err(AuthError::NotRegistered);
        }

        if !self.rate_limiter.admit(&headers.extension_id, now) {
            warn!(
                event = "RATE_LIMIT_EXCEEDED",
                extension_id = %headers.extension_id,
                "Rate limit exceeded"
            );
            return Err(AuthError::RateLimited);
        }

        self.registry.touch_activity(&headers.extension_id, now);
        Ok(headers.extension_id.clone())
    }

    /// Register an extension session
    ///
    /// The identity claimed in the `X-Extension-ID` header must match the
    /// identity embedded in the request body; a mismatch creates no session
    /// for either identity.
    pub fn register(
        &self,
        header_extension_id: &str,
        header_version: &str,
        token: &str,
        request: RegisterRequest,
    ) -> Result<(), AuthError> {
        if request.identity.extension_id != header_extension_id {
            warn!(
                event = "REGISTRATION_MISMATCH",
                header_extension_id = %header_extension_id,
                body_extension_id = %request.identity.extension_id,
                "Registration identity mismatch"
            );
            return Err(AuthError::IdentityMismatch);
        }

        let now = self.clock.now();
        let identity = request.identity;
        let fingerprint = identity.fingerprint.clone();
        let user_agent = identity.user_agent.clone();
        let timezone = identity.timezone.clone();

        match self.registry.register(identity, token, now) {
            Ok(()) => {
                info!(
                    event = "EXTENSION_REGISTERED",
                    extension_id = %header_extension_id,
                    extension_version = %header_version,
                    fingerprint = %fingerprint,
                    user_agent = %user_agent,
                    timezone = %timezone,
                    "Extension registered"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = "MAX_EXTENSIONS_REACHED",
                    current_count = self.registry.len(),
                    max_allowed = self.config.max_extensions,
                    "Registration rejected at capacity"
                );
                Err(err)
            }
        }
    }

    /// Snapshot of a registered session
    pub fn session(&self, extension_id: &str) -> Option<Session> {
        self.registry.get(extension_id)
    }

    /// Sweep idle sessions and quiet rate-limiter windows
    ///
    /// Called by the cleanup scheduler. Emits one audit event per evicted
    /// identity and returns how many sessions were removed.
    pub fn sweep(&self, idle_threshold: Duration) -> usize {
        let now = self.clock.now();

        let removed = self.registry.sweep_expired(now, idle_threshold);
        for extension_id in &removed {
            info!(
                event = "SESSION_EXPIRED",
                extension_id = %extension_id,
                "Session evicted after idle expiry"
            );
        }

        self.rate_limiter.cleanup(now);
        removed.len()
    }

    /// Current number of registered sessions
    pub fn session_count(&self) -> usize {
        self.registry.len()
    }
}

/// Shorten a token for audit logging; the full credential is never logged
fn truncate_token(token: &str) -> String {
    let cut = token
        .char_indices()
        .nth(AUDIT_TOKEN_PREVIEW)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    format!("{}...", &token[..cut])
}
