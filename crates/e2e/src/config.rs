//! Harness configuration
//!
//! Values come from an optional TOML file and are overridden by CLI flags and
//! environment variables in the harness binary. The TMDB API key is never
//! compiled in; it arrives through `TMDB_KEY` or the config file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{E2eError, E2eResult};
use crate::selectors::SelectorProfile;

/// Top-level harness configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// TMDB API configuration
    pub tmdb: TmdbConfig,

    /// Application under test
    pub app: AppConfig,
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

/// TMDB API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// v3 API key, sent as the `api_key` query parameter
    pub api_key: Option<String>,

    /// API root, e.g. `https://api.themoviedb.org/3`
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TmdbConfig {
    /// The configured API key, or `ApiKeyMissing` when unset or blank
    pub fn api_key(&self) -> E2eResult<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(E2eError::ApiKeyMissing),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.themoviedb.org/3".to_string(),
            timeout_secs: 30,
        }
    }
}

// Keeps the key out of logs.
impl fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Application-under-test settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of an already running front end
    pub base_url: String,

    /// Command that starts the front end; when set the harness spawns it
    pub command: Option<String>,

    /// Working directory for `command`
    pub workdir: Option<String>,

    /// Which selector set the front end exposes
    pub selectors: SelectorProfile,

    /// Number of movie cards rendered on first load of a list page
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            command: None,
            workdir: None,
            selectors: SelectorProfile::default(),
            page_size: 7,
        }
    }
}
