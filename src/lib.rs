//! Brand-Watcher: new-arrival alerts for a retailer's brand listing
//!
//! This crate crawls a paginated brand listing, extracts product identifiers with a
//! layered set of scraping strategies, diffs them against the identifiers seen on
//! previous runs and emails a summary when something new shows up.

pub mod config;
pub mod crawler;
pub mod notify;
pub mod state;
pub mod storage;
pub mod url;
pub mod watch;

use thiserror::Error;

/// Main error type for Brand-Watcher operations
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url} after {attempts} attempt(s): {source}")]
    Fetch {
        url: String,
        attempts: u32,
        source: crawler::FetchError,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Notification error: {0}")]
    Notify(#[from] notify::NotifyError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Brand-Watcher operations
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{diff, CrawlResult, DiffResult, Product, SeenSet};
pub use url::absolutize;
pub use watch::{run_watch, RunSummary};
