//! Configuration management for the qanda server.
//!
//! Supports multiple configuration sources with precedence:
//! 1. Environment variables (highest priority)
//! 2. TOML configuration file
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main configuration structure for the qanda server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Token signing and role derivation
    #[serde(default)]
    pub auth: AuthConfig,

    /// Question image storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration (host, port)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// REST API port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database URL (default: "sqlite://qanda.db")
    #[serde(default = "default_db_url")]
    pub url: String,
}

/// Token signing and role derivation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric signing key for bearer tokens. Must be overridden outside
    /// of development.
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    /// Access token lifetime in minutes (default: 30)
    #[serde(default = "default_access_token_expiration")]
    pub access_token_expiration_minutes: i64,

    /// Refresh token lifetime in minutes (default: 420)
    #[serde(default = "default_refresh_token_expiration")]
    pub refresh_token_expiration_minutes: i64,

    /// Emails that receive the admin role at registration.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

/// Question image storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory question images are stored under (default: "question-images")
    #[serde(default = "default_image_dir")]
    pub image_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error (default: "info")
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Loads configuration from a TOML file, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&raw)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Builds a configuration from defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("QANDA_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("QANDA_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(url) = std::env::var("QANDA_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(key) = std::env::var("QANDA_SECRET_KEY") {
            self.auth.secret_key = key;
        }
        if let Ok(emails) = std::env::var("QANDA_ADMIN_EMAILS") {
            self.auth.admin_emails = emails
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
                .collect();
        }
        if let Ok(dir) = std::env::var("QANDA_IMAGE_DIR") {
            self.storage.image_dir = dir;
        }
        if let Ok(level) = std::env::var("QANDA_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            access_token_expiration_minutes: default_access_token_expiration(),
            refresh_token_expiration_minutes: default_refresh_token_expiration(),
            admin_emails: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    30
}

fn default_db_url() -> String {
    "sqlite://qanda.db".to_string()
}

fn default_secret_key() -> String {
    "qanda-development-secret-key-change-me".to_string()
}

fn default_access_token_expiration() -> i64 {
    30
}

fn default_refresh_token_expiration() -> i64 {
    420
}

fn default_image_dir() -> String {
    "question-images".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
