//! Application error types for extension-gate
//!
//! This module defines common error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Authentication-related errors
///
/// Every rejection the gate produces maps to exactly one of these variants.
/// Format, signature, and expiry failures are collapsed into `InvalidToken`
/// so the caller cannot learn which check failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// Token or extension ID header missing
    #[error("Missing authentication headers")]
    MissingCredentials,

    /// Token format, signature, or expiry check failed
    #[error("Invalid token")]
    InvalidToken,

    /// Extension not registered or inactive
    #[error("Extension not registered or inactive")]
    NotRegistered,

    /// Too many requests inside the sliding window
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Registration header and body disagree on the extension ID
    #[error("Extension ID mismatch")]
    IdentityMismatch,

    /// Session registry is at its size cap
    #[error("Maximum extensions reached")]
    RegistryFull,
}

/// Configuration loading errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    /// Failed to parse configuration content
    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Server lifecycle errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address
    #[error("Failed to bind to address: {0}")]
    Bind(String),

    /// Failed to serve requests
    #[error("Server error: {0}")]
    Serve(String),
}
