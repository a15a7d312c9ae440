//! Crawler module for fetching and reading brand listings
//!
//! This module contains the crawling logic, including:
//! - HTTP fetching with retry and backoff
//! - Product extraction with layered fallback strategies
//! - Next-page discovery
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod paginator;

pub use coordinator::{Crawler, DEFAULT_MAX_PAGES};
pub use extractor::{extract_products, ListingPage, Strategy, STRATEGIES};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, RetryPolicy};
pub use paginator::{find_next_page, next_page_url};

use crate::config::Config;
use crate::state::CrawlResult;
use crate::WatcherError;

/// Crawls the configured brand listing
///
/// # Arguments
///
/// * `config` - The watcher configuration
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Every product found across the listing's pages
/// * `Err(WatcherError)` - A page could not be fetched
pub async fn crawl(config: &Config) -> Result<CrawlResult, WatcherError> {
    Crawler::from_config(&config.fetch)?
        .crawl(&config.watch.brand_url)
        .await
}
