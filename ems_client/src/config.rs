//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::{path::PathBuf, time::Duration};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
const MAX_SEARCH_DEBOUNCE_MS: u64 = 10_000;
const LOG_FILE_NAME: &str = "ems_client.log";

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash
    pub api_base_url: String,
    /// Directory holding the persisted session
    pub session_dir: PathBuf,
    /// Quiet period before a search is sent
    pub search_debounce: Duration,
    /// Where log output goes; the terminal belongs to the TUI
    pub log_file: PathBuf,
}

/// Values given on the command line, taking precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server: Option<String>,
    pub session_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI args
    ///
    /// # Errors
    ///
    /// * `ConfigError::MissingRequired` - No session directory given and no
    ///   home directory to default to
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let api_base_url = overrides
            .server
            .or_else(|| std::env::var("EMS_API_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let session_dir = match overrides
            .session_dir
            .or_else(|| std::env::var_os("EMS_SESSION_DIR").map(PathBuf::from))
        {
            Some(dir) => dir,
            None => std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".ems"))
                .ok_or_else(|| ConfigError::MissingRequired {
                    var: "EMS_SESSION_DIR".to_string(),
                    hint: "Set HOME or pass --session-dir".to_string(),
                })?,
        };

        let log_file = overrides
            .log_file
            .or_else(|| std::env::var_os("EMS_LOG_FILE").map(PathBuf::from))
            .unwrap_or_else(|| session_dir.join(LOG_FILE_NAME));

        let search_debounce = Duration::from_millis(parse_env_or(
            "EMS_SEARCH_DEBOUNCE_MS",
            DEFAULT_SEARCH_DEBOUNCE_MS,
        ));

        Ok(ClientConfig {
            api_base_url,
            session_dir,
            search_debounce,
            log_file,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme_ok = ["http://", "https://"]
            .iter()
            .any(|scheme| self.api_base_url.starts_with(scheme));
        if !scheme_ok || self.api_base_url.len() <= "https://".len() {
            return Err(ConfigError::Invalid {
                var: "EMS_API_BASE_URL".to_string(),
                reason: format!(
                    "Must be an http:// or https:// URL, got '{}'",
                    self.api_base_url
                ),
            });
        }

        let debounce_ms = self.search_debounce.as_millis();
        if debounce_ms == 0 || debounce_ms > MAX_SEARCH_DEBOUNCE_MS as u128 {
            return Err(ConfigError::Invalid {
                var: "EMS_SEARCH_DEBOUNCE_MS".to_string(),
                reason: format!("Must be between 1 and {MAX_SEARCH_DEBOUNCE_MS}"),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
