//! Crawl coordination - walks a paginated listing from its first page
//!
//! The crawler fetches the start page, extracts its products, follows the next
//! page link and repeats until one of the following:
//! - A page has no next link
//! - A next link points back at a page already fetched
//! - The configured page limit is reached
//!
//! A page that cannot be fetched (after retries) aborts the whole crawl, so a
//! partial listing is never mistaken for the full one.

use crate::config::FetchConfig;
use crate::crawler::extractor::ListingPage;
use crate::crawler::fetcher::Fetcher;
use crate::state::{CrawlResult, StopReason};
use crate::url::visit_key;
use crate::WatcherError;
use std::collections::HashSet;
use url::Url;

/// Default bound on listing pages per crawl
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Walks paginated listings and collects their products
#[derive(Debug, Clone)]
pub struct Crawler {
    fetcher: Fetcher,
    max_pages: u32,
}

impl Crawler {
    pub fn new(fetcher: Fetcher, max_pages: u32) -> Self {
        Self {
            fetcher,
            max_pages: max_pages.max(1),
        }
    }

    /// Builds a crawler with an HTTP client and retry policy from `config`
    pub fn from_config(config: &FetchConfig) -> Result<Self, WatcherError> {
        Ok(Self::new(Fetcher::from_config(config)?, config.max_pages))
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Crawls every page reachable through next-page links from `start_url`
    ///
    /// Products are merged by id across pages; a later page's record replaces an
    /// earlier one.
    ///
    /// # Arguments
    ///
    /// * `start_url` - The first listing page
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - All products found, with page count and stop reason
    /// * `Err(WatcherError)` - The start URL is invalid or a page fetch failed
    pub async fn crawl(&self, start_url: &str) -> Result<CrawlResult, WatcherError> {
        let mut result = CrawlResult::new();
        let mut visited = HashSet::new();
        let mut next = Some(Url::parse(start_url)?);

        tracing::info!("Starting crawl at {}", start_url);

        while let Some(url) = next.take() {
            if !visited.insert(visit_key(&url)) {
                tracing::warn!("Next page {} was already fetched, stopping", url);
                result.stop_reason = StopReason::CycleDetected;
                break;
            }

            if result.pages_fetched >= self.max_pages {
                tracing::warn!(
                    "Reached page limit of {}, not fetching {}",
                    self.max_pages,
                    url
                );
                result.stop_reason = StopReason::PageLimit;
                break;
            }

            let page = self.fetcher.fetch(url.as_str()).await?;
            result.pages_fetched += 1;

            // Relative links resolve against where the page was actually served from
            let page_url = match Url::parse(&page.final_url) {
                Ok(final_url) => {
                    visited.insert(visit_key(&final_url));
                    final_url
                }
                Err(_) => url,
            };

            let (products, next_url) = {
                let listing = ListingPage::parse(&page.body, &page_url);
                (listing.products(), listing.next_page())
            };

            tracing::info!(
                "Page {}: {} product(s) at {}",
                result.pages_fetched,
                products.len(),
                page_url
            );

            result.extend(products);
            next = next_url;
        }

        tracing::info!(
            "Crawl finished: {} product(s) across {} page(s), {}",
            result.len(),
            result.pages_fetched,
            result.stop_reason
        );

        Ok(result)
    }
}
