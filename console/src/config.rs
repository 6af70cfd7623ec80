//! Console configuration loaded via OrthoConfig.
//!
//! Values come from (highest precedence first) command line, `CONSOLE_*`
//! environment variables, and the optional configuration file OrthoConfig
//! discovers.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_API_BASE_URL: &str = "https://api.minihome.page/api";

fn default_profile_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".minihome-console")
}

/// Settings for the admin console: API endpoint, transport tuning, and the
/// profile directory the session token persists in.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CONSOLE")]
pub struct ConsoleSettings {
    /// Base URL of the admin API, including the `/api` path segment.
    pub api_base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Automatic retries for transient query failures.
    #[ortho_config(default = 1)]
    pub retry_limit: u32,
    /// Optional override for the profile directory.
    pub profile_dir: Option<PathBuf>,
}

impl ConsoleSettings {
    /// Return the configured API base URL, falling back to the default.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Return the configured profile directory, falling back to a dot
    /// directory under the user's home.
    #[must_use]
    pub fn profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(default_profile_dir)
    }
}
