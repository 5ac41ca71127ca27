//! Configuration
//!
//! Loads settings from a TOML file with environment variable overrides.
//! The API base URL must end up as an absolute http(s) URL or the client
//! refuses to start.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_BASE: &str = "TASKBOARD_API_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG_LEVEL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Backend connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Timing of the interactive screens
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_toast_ttl")]
    pub toast_ttl_ms: u64,

    #[serde(default = "default_signup_redirect")]
    pub signup_redirect_ms: u64,
}

fn default_search_debounce() -> u64 {
    1000
}

fn default_toast_ttl() -> u64 {
    3000
}

fn default_signup_redirect() -> u64 {
    1500
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce(),
            toast_ttl_ms: default_toast_ttl(),
            signup_redirect_ms: default_signup_redirect(),
        }
    }
}

impl UiConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }

    pub fn signup_redirect(&self) -> Duration {
        Duration::from_millis(self.signup_redirect_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let mut config = Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load with environment overrides; an explicit path must exist,
    /// default locations are skipped when missing.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::load_default()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_default() -> Result<Self, ConfigError> {
        for path in default_paths() {
            if path.exists() {
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_API_BASE) {
            self.api.base_url = Some(url);
        }
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }

    /// Validated base URL for every API request.
    pub fn api_base(&self) -> Result<ApiBase, ConfigError> {
        match self.api.base_url.as_deref() {
            Some(raw) => ApiBase::parse(raw),
            None => Err(ConfigError::MissingApiBase),
        }
    }
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("taskboard").join("config.toml"));
    }
    paths.push(PathBuf::from("./taskboard.toml"));
    paths
}

/// Absolute http(s) URL without trailing slashes; request paths are appended verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(String);

impl ApiBase {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::MissingApiBase);
        }

        let lower = trimmed.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(ConfigError::InvalidApiBase(raw.to_string()));
        }
        if reqwest::Url::parse(trimmed).is_err() {
            return Err(ConfigError::InvalidApiBase(raw.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl fmt::Display for ApiBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("API base URL is not set (use --api-base, TASKBOARD_API_BASE_URL or [api] base_url)")]
    MissingApiBase,

    #[error("API base URL '{0}' is not a valid absolute http(s) URL")]
    InvalidApiBase(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# taskboard configuration
#
# Environment variables override these settings:
# - TASKBOARD_API_BASE_URL
# - TASKBOARD_LOG_LEVEL

[api]
# Absolute http(s) URL of the task backend
base_url = "http://localhost:8080"
timeout_secs = 30

[ui]
# Quiet period before the search box filters the list (ms)
search_debounce_ms = 1000
# How long notifications stay on screen (ms)
toast_ttl_ms = 3000
# Delay between a successful signup and the login screen (ms)
signup_redirect_ms = 1500

[logging]
level = "info"
# file = "/tmp/taskboard.log"
"#
    .to_string()
}
