//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QUICKPICK_API_URL` - Base URL of the QuickPick REST API (http or https)
//!
//! ## Optional
//! - `QUICKPICK_SESSION_PATH` - Customer session file (default: `<data dir>/quickpick/session.json`)
//! - `QUICKPICK_ADMIN_SESSION_PATH` - Back-office session file (default: `<data dir>/quickpick/admin-session.json`)
//! - `QUICKPICK_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `QUICKPICK_LOCALE` - Preferred content locale (default: en)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const SESSION_FILE: &str = "session.json";
const ADMIN_SESSION_FILE: &str = "admin-session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// QuickPick API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the REST API, always ending in `/`
    pub base_url: Url,
    /// Where the customer session (`token` + `user`) is persisted
    pub session_path: PathBuf,
    /// Where the back-office session is persisted
    pub admin_session_path: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
    /// Preferred locale for localized content and server messages
    pub locale: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `QUICKPICK_API_URL` is missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(&get_required_env("QUICKPICK_API_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("QUICKPICK_API_URL".to_owned(), e))?;

        let data_dir = default_data_dir();
        let session_path = get_optional_env("QUICKPICK_SESSION_PATH")
            .map_or_else(|| data_dir.join(SESSION_FILE), PathBuf::from);
        let admin_session_path = get_optional_env("QUICKPICK_ADMIN_SESSION_PATH")
            .map_or_else(|| data_dir.join(ADMIN_SESSION_FILE), PathBuf::from);

        let timeout_secs = get_env_or_default("QUICKPICK_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "QUICKPICK_TIMEOUT_SECS".to_owned(),
                    "must be a positive number of seconds".to_owned(),
                )
            })?;

        let locale = get_env_or_default("QUICKPICK_LOCALE", quickpick_core::DEFAULT_LOCALE);
        if locale.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "QUICKPICK_LOCALE".to_owned(),
                "cannot be empty".to_owned(),
            ));
        }

        Ok(Self {
            base_url,
            session_path,
            admin_session_path,
            timeout: Duration::from_secs(timeout_secs),
            locale,
        })
    }

    /// Configuration pointing at `base_url` with default settings.
    ///
    /// Session files land in the platform data directory; tests should
    /// override both paths.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not an absolute
    /// http(s) URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("QUICKPICK_API_URL".to_owned(), e))?;
        let data_dir = default_data_dir();
        Ok(Self {
            base_url,
            session_path: data_dir.join(SESSION_FILE),
            admin_session_path: data_dir.join(ADMIN_SESSION_FILE),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            locale: quickpick_core::DEFAULT_LOCALE.to_owned(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL and make sure relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("URL must have a host".to_owned());
    }
    // Url::join replaces the last segment unless the path ends in '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quickpick")
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
