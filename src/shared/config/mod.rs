//! Application configuration module
//!
//! Validated settings for the offline engine, assembled through a builder.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default backend URL
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Default timeout for a single backend request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL, without trailing slash
    pub server_url: String,
    /// SQLite file holding the local store; `None` keeps it in memory
    pub database_path: Option<PathBuf>,
    /// Bearer token for backend calls
    pub token: Option<String>,
    /// Timeout for one backend request
    pub request_timeout: Duration,
    /// Periodic sync while online; `None` syncs only on reconnect or demand
    pub auto_sync_interval: Option<Duration>,
    /// Upper bound for the retry delay after repeated sync failures
    pub max_retry_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            database_path: None,
            token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            auto_sync_interval: None,
            max_retry_interval: Duration::from_secs(300),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.server_url.clone()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout",
                message: "must be greater than zero".to_string(),
            });
        }
        if matches!(self.auto_sync_interval, Some(interval) if interval.is_zero()) {
            return Err(ConfigError::InvalidValue {
                field: "auto_sync_interval",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    database_path: Option<PathBuf>,
    token: Option<String>,
    request_timeout: Option<Duration>,
    auto_sync_interval: Option<Duration>,
    max_retry_interval: Option<Duration>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the SQLite file path
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn auto_sync_interval(mut self, interval: Duration) -> Self {
        self.auto_sync_interval = Some(interval);
        self
    }

    pub fn max_retry_interval(mut self, interval: Duration) -> Self {
        self.max_retry_interval = Some(interval);
        self
    }

    /// Merge values from a parsed TOML file; values already set win
    pub fn merge_file(mut self, file: FileConfig) -> Self {
        if self.server_url.is_none() {
            self.server_url = file.server_url;
        }
        if self.database_path.is_none() {
            self.database_path = file.database_path;
        }
        if self.token.is_none() {
            self.token = file.token;
        }
        if self.request_timeout.is_none() {
            self.request_timeout = file.request_timeout_secs.map(Duration::from_secs);
        }
        if self.auto_sync_interval.is_none() {
            self.auto_sync_interval = file.auto_sync_interval_secs.map(Duration::from_secs);
        }
        if self.max_retry_interval.is_none() {
            self.max_retry_interval = file.max_retry_interval_secs.map(Duration::from_secs);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            server_url: self
                .server_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.server_url),
            database_path: self.database_path,
            token: self.token,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            auto_sync_interval: self.auto_sync_interval,
            max_retry_interval: self.max_retry_interval.unwrap_or(defaults.max_retry_interval),
        };
        config.validate()?;
        Ok(config)
    }
}

/// On-disk configuration file layout
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server_url: Option<String>,
    pub database_path: Option<PathBuf>,
    pub token: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub auto_sync_interval_secs: Option<u64>,
    pub max_retry_interval_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
