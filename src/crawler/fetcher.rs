//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the watcher, including:
//! - Building HTTP clients with browser-like headers and a bounded timeout
//! - GET requests for listing pages
//! - Retry with exponential backoff for failed attempts
//! - Error classification for logging

use crate::config::FetchConfig;
use crate::{ConfigError, WatcherError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a single fetch attempt failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// How often and how patiently to retry a failed fetch
///
/// The delay after attempt `n` is `multiplier * 2^(n - 1)` seconds, clamped to
/// `[min_delay, max_delay]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub multiplier_secs: f64,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier_secs: 1.0,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            multiplier_secs: config.backoff_multiplier_secs,
            min_delay: Duration::from_millis(config.backoff_min_ms),
            max_delay: Duration::from_millis(config.backoff_max_ms),
        }
    }

    /// Retries immediately, mostly useful against local servers
    pub fn without_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            multiplier_secs: 0.0,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let max_secs = self.max_delay.as_secs_f64();
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let secs = self.multiplier_secs * 2f64.powi(exponent);

        let secs = if secs.is_finite() {
            secs.clamp(0.0, max_secs)
        } else {
            max_secs
        };

        Duration::from_secs_f64(secs)
            .max(self.min_delay)
            .min(self.max_delay)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(WatcherError)` - Invalid header value or client construction failure
///
/// # Example
///
/// ```no_run
/// use brand_watcher::config::FetchConfig;
/// use brand_watcher::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, WatcherError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language).map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid accept-language '{}': {}",
                config.accept_language, e
            ))
        })?,
    );

    let timeout = Duration::from_secs(config.timeout_secs);

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches listing pages, retrying failed attempts per its `RetryPolicy`
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, WatcherError> {
        Ok(Self::new(
            build_http_client(config)?,
            RetryPolicy::from_config(config),
        ))
    }

    /// Fetches a URL, retrying on any failure
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return the body |
    /// | Any other status | Retry after backoff |
    /// | Timeout / connection error | Retry after backoff |
    /// | Body read failure | Retry after backoff |
    /// | Attempts exhausted | `WatcherError::Fetch` (fatal for the run) |
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, WatcherError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.fetch_once(url).await {
                Ok(page) => {
                    if attempt > 1 {
                        tracing::info!("Fetched {} on attempt {}", url, attempt);
                    }
                    return Ok(page);
                }
                Err(error) if attempt < max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                        attempt,
                        max_attempts,
                        url,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!(
                        "Giving up on {} after {} attempt(s): {}",
                        url,
                        attempt,
                        error
                    );
                    return Err(WatcherError::Fetch {
                        url: url.to_string(),
                        attempts: attempt,
                        source: error,
                    });
                }
            }
        }
    }

    /// Performs a single GET without retrying
    async fn fetch_once(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}
