use crate::client::local_db::LocalStore;
use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError, FileConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_URL: &str = "STUDYCACHE_API_URL";
pub const ENV_DB_PATH: &str = "STUDYCACHE_DB_PATH";
pub const ENV_TOKEN: &str = "STUDYCACHE_TOKEN";
pub const ENV_SYNC_INTERVAL: &str = "STUDYCACHE_SYNC_INTERVAL_SECS";
/// Optional TOML file merged under the environment
pub const ENV_CONFIG_FILE: &str = "STUDYCACHE_CONFIG";

/// Client configuration wrapper.
///
/// Values are layered: environment variables, then the TOML file, then
/// built-in defaults. The store lives under the platform data directory
/// unless a path is configured.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        let app = AppConfig {
            database_path: Some(LocalStore::default_path()),
            ..AppConfig::default()
        };
        Self { app }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the environment and the file named by `STUDYCACHE_CONFIG`
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var_os(ENV_CONFIG_FILE).map(PathBuf::from);
        Self::load_from(file.as_deref())
    }

    /// Load from the environment layered over an optional TOML file
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = builder_from_env()?;
        if let Some(path) = file {
            let source = std::fs::read_to_string(path)?;
            builder = builder.merge_file(FileConfig::from_toml(&source)?);
            tracing::debug!(path = %path.display(), "Loaded config file");
        }
        Self::with_builder(builder)
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let mut app = builder.build()?;
        if app.database_path.is_none() {
            app.database_path = Some(LocalStore::default_path());
        }
        Ok(Self { app })
    }

    /// Set the bearer token
    pub fn set_token(&mut self, token: Option<String>) {
        self.app.token = token;
    }

    pub fn get_token(&self) -> Option<&str> {
        self.app.token.as_deref()
    }

    /// Clear the token (logout)
    pub fn clear_token(&mut self) {
        self.app.token = None;
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    pub fn server_url(&self) -> &str {
        &self.app.server_url
    }

    pub fn database_path(&self) -> Option<&Path> {
        self.app.database_path.as_deref()
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }
}

fn builder_from_env() -> Result<AppConfigBuilder, ConfigError> {
    let mut builder = AppConfig::builder();
    if let Some(url) = env_value(ENV_API_URL) {
        builder = builder.server_url(url);
    }
    if let Some(path) = env_value(ENV_DB_PATH) {
        builder = builder.database_path(path);
    }
    if let Some(token) = env_value(ENV_TOKEN) {
        builder = builder.token(token);
    }
    if let Some(secs) = env_value(ENV_SYNC_INTERVAL) {
        let secs: u64 = secs.parse().map_err(|_| ConfigError::InvalidValue {
            field: "auto_sync_interval",
            message: format!("{} must be a number of seconds, got '{}'", ENV_SYNC_INTERVAL, secs),
        })?;
        builder = builder.auto_sync_interval(Duration::from_secs(secs));
    }
    Ok(builder)
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
