//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Server failed to start: {0}")]
    ServerStartup(String),

    #[error("Server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("TMDB API key missing: set TMDB_KEY or `tmdb.api_key` in the config file")]
    ApiKeyMissing,

    #[error("TMDB request to {endpoint} failed with status {status}: {body}")]
    ApiStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Malformed TMDB response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Reference data for group '{0}' was not fetched")]
    MissingReference(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
