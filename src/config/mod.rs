//! Configuration management for extension-gate
//!
//! This module handles loading, parsing, and validating application
//! configuration from YAML files and environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication gate configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Session cleanup configuration
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // Expand ${VAR} references before parsing
        let expanded = expand_env_vars(yaml);
        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from environment variables with prefix EXTENSION_GATE_
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(host) = std::env::var("EXTENSION_GATE_SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("EXTENSION_GATE_SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid port number".to_string()))?;
        }
        if let Ok(hours) = std::env::var("EXTENSION_GATE_TOKEN_EXPIRY_HOURS") {
            config.auth.token_expiry_hours = hours
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid token expiry".to_string()))?;
        }
        if let Ok(max) = std::env::var("EXTENSION_GATE_MAX_REQUESTS_PER_MIN") {
            config.auth.rate_limit.max_per_window = max
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid rate limit".to_string()))?;
        }
        if let Ok(max) = std::env::var("EXTENSION_GATE_MAX_EXTENSIONS") {
            config.auth.max_extensions = max
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid extension cap".to_string()))?;
        }
        if let Ok(level) = std::env::var("EXTENSION_GATE_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Authentication gate configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Maximum accepted token age in hours
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: i64,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Session registry size cap
    #[serde(default = "default_max_extensions")]
    pub max_extensions: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_expiry_hours: default_token_expiry_hours(),
            rate_limit: RateLimitConfig::default(),
            max_extensions: default_max_extensions(),
        }
    }
}

fn default_token_expiry_hours() -> i64 {
    crate::auth::TOKEN_EXPIRY_HOURS
}

fn default_max_extensions() -> usize {
    crate::auth::MAX_EXTENSIONS
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per window
    #[serde(default = "default_max_per_window")]
    pub max_per_window: usize,

    /// Window width in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: default_max_per_window(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_per_window() -> usize {
    crate::auth::MAX_REQUESTS_PER_MIN
}

fn default_window_secs() -> u64 {
    60
}

/// Session cleanup configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanupConfig {
    /// Time between sweeps in seconds
    #[serde(default = "default_cleanup_interval_secs")]
    pub interval_secs: u64,

    /// Idle days after which a session is evicted
    #[serde(default = "default_idle_expiry_days")]
    pub idle_expiry_days: i64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_cleanup_interval_secs(),
            idle_expiry_days: default_idle_expiry_days(),
        }
    }
}

fn default_cleanup_interval_secs() -> u64 {
    crate::auth::CLEANUP_INTERVAL_SECS
}

fn default_idle_expiry_days() -> i64 {
    crate::auth::SESSION_IDLE_EXPIRY_DAYS
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "extension_gate=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Replace `${VAR}` references with environment variable values
///
/// Unknown variables expand to the empty string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        match rest[start + 2..].find('}') {
            Some(end) => {
                let name = &rest[start + 2..start + 2 + end];
                if let Ok(value) = std::env::var(name) {
                    result.push_str(&value);
                }
                rest = &rest[start + 2 + end + 1..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: Default config has the original service's constants
    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_expiry_hours, 24);
        assert_eq!(config.auth.rate_limit.max_per_window, 120);
        assert_eq!(config.auth.rate_limit.window_secs, 60);
        assert_eq!(config.auth.max_extensions, 10_000);
        assert_eq!(config.cleanup.interval_secs, 3600);
        assert_eq!(config.cleanup.idle_expiry_days, 7);
        assert_eq!(config.logging.level, "info");
    }

    // Test 2: YAML parsing with partial sections falls back to defaults
    #[test]
    fn test_from_yaml_partial() {
        let yaml = r#"
server:
  port: 9090
auth:
  rate_limit:
    max_per_window: 5
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.rate_limit.max_per_window, 5);
        assert_eq!(config.auth.token_expiry_hours, 24);
    }

    // Test 3: Invalid YAML is a parse error
    #[test]
    fn test_from_yaml_invalid() {
        let result = Config::from_yaml("server: [not a mapping");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    // Test 4: Missing file is a read error
    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file("/nonexistent/config.yaml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }

    // Test 5: Environment variable expansion in YAML
    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("EXT_GATE_TEST_HOST", "127.0.0.1");
        let yaml = "server:\n  host: \"${EXT_GATE_TEST_HOST}\"\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        std::env::remove_var("EXT_GATE_TEST_HOST");
    }

    // Test 6: Unknown variables expand to empty, unterminated stays literal
    #[test]
    fn test_expand_env_vars_edge_cases() {
        assert_eq!(expand_env_vars("a ${EXT_GATE_DOES_NOT_EXIST} b"), "a  b");
        assert_eq!(expand_env_vars("tail ${UNCLOSED"), "tail ${UNCLOSED");
        assert_eq!(expand_env_vars("no vars"), "no vars");
    }

    // Test 7: Config round-trips through YAML
    #[test]
    fn test_yaml_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
