//! Configuration management for stockroom
//!
//! This module handles loading, parsing, and validating application
//! configuration from YAML files and environment variables. The loaded
//! `Config` is immutable: it is built once at startup and passed by
//! reference into the components that need it.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Attachment storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // Expand ${VAR} references before parsing so secrets can live in the
        // environment rather than the file.
        let expanded = expand_env_vars(yaml);
        serde_yaml::from_str(&expanded)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from environment variables with prefix STOCKROOM_
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(host) = std::env::var("STOCKROOM_SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("STOCKROOM_SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid port number".to_string()))?;
        }

        if let Ok(secret) = std::env::var("STOCKROOM_AUTH_TOKEN_SECRET") {
            config.auth.token_secret = Some(secret);
        }
        if let Ok(ttl) = std::env::var("STOCKROOM_AUTH_TOKEN_TTL_SECS") {
            config.auth.token_ttl_secs = ttl
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid token TTL".to_string()))?;
        }

        if let Ok(path) = std::env::var("STOCKROOM_DATABASE_PATH") {
            config.database.path = path;
        }
        if let Ok(dir) = std::env::var("STOCKROOM_STORAGE_UPLOAD_DIR") {
            config.storage.upload_dir = dir;
        }
        if let Ok(level) = std::env::var("STOCKROOM_LOGGING_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// The token signing secret, required for startup
    pub fn require_token_secret(&self) -> Result<&str, ConfigError> {
        self.auth
            .token_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("auth.token_secret".to_string()))
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
    3000
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Secret used to sign session tokens; required at startup
    pub token_secret: Option<String>,

    /// Session token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Rate limiting for failed login attempts
    #[serde(default)]
    pub rate_limit: LoginRateLimitConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            token_ttl_secs: default_token_ttl(),
            rate_limit: LoginRateLimitConfig::default(),
        }
    }
}

fn default_token_ttl() -> u64 {
    3600 // 1 hour
}

/// Rate limiting configuration for login failures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRateLimitConfig {
    /// Maximum number of failed attempts before blocking
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,

    /// Duration to block after max failures (in seconds)
    #[serde(default = "default_block_duration")]
    pub block_duration_secs: u64,

    /// Sliding window after which the failure count resets (in seconds)
    #[serde(default = "default_window_duration")]
    pub window_duration_secs: u64,
}

impl Default for LoginRateLimitConfig {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            block_duration_secs: default_block_duration(),
            window_duration_secs: default_window_duration(),
        }
    }
}

fn default_max_failures() -> u32 {
    10
}

fn default_block_duration() -> u64 {
    300
}

fn default_window_duration() -> u64 {
    600
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "stockroom.db".to_string()
}

/// Attachment storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory where uploaded attachments are written
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
        }
    }
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "stockroom=debug")
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

/// Configuration error types
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    FileRead(String),

    /// Error parsing configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

/// Expand environment variables in a string
///
/// Supports `${VAR_NAME}` syntax
fn expand_env_vars(input: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .expect("Invalid regex pattern for environment variable expansion");

    re.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
