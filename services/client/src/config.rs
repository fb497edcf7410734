//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Budget for ordinary reads and writes.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Budget for file uploads.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_millis(15_000);

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base address of the REST API, always ending in `/`.
    pub api_url: String,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    /// Where a remembered credential is kept. `None` means the platform default.
    pub session_path: Option<PathBuf>,
    pub log_level: Level,
}

impl Config {
    /// Builds a configuration for the given base address with default budgets.
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: normalize_base_url(api_url),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            session_path: None,
            log_level: Level::INFO,
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let api_url = std::env::var("PODSCRIPT_API_URL")
            .map_err(|_| ConfigError::MissingVar("PODSCRIPT_API_URL".to_string()))?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "PODSCRIPT_API_URL".to_string(),
                format!("'{}' is not an http(s) address", api_url),
            ));
        }

        let request_timeout =
            timeout_var("PODSCRIPT_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT)?;
        let upload_timeout = timeout_var("PODSCRIPT_UPLOAD_TIMEOUT_MS", DEFAULT_UPLOAD_TIMEOUT)?;

        let session_path = std::env::var("PODSCRIPT_SESSION_PATH").ok().map(PathBuf::from);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_url: normalize_base_url(&api_url),
            request_timeout,
            upload_timeout,
            session_path,
            log_level,
        })
    }
}

fn timeout_var(name: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Request paths are joined onto the base, so it must end in exactly one `/`.
fn normalize_base_url(raw: &str) -> String {
    format!("{}/", raw.trim().trim_end_matches('/'))
}
