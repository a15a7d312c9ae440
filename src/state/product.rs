//! Product and crawl result definitions
//!
//! A product is identified by its `pid` alone; accumulation happens in a map keyed
//! by that id instead of through custom equality.

use std::collections::btree_map::{BTreeMap, Values};
use std::fmt;

/// A single product found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Stable identifier, never empty
    pub pid: String,

    /// Absolute product URL, empty when the listing did not expose one
    pub url: String,

    /// Display title, possibly empty
    pub title: String,
}

impl Product {
    /// Creates a product, trimming all fields
    ///
    /// Returns `None` when the identifier is blank.
    pub fn new(pid: &str, url: &str, title: &str) -> Option<Self> {
        let pid = pid.trim();
        if pid.is_empty() {
            return None;
        }

        Some(Self {
            pid: pid.to_string(),
            url: url.trim().to_string(),
            title: title.trim().to_string(),
        })
    }

    /// Title to show to a human, falling back to the id
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.pid
        } else {
            &self.title
        }
    }
}

/// Why a crawl stopped following pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// The last page had no next link
    #[default]
    Exhausted,

    /// A next link pointed at a page already fetched in this crawl
    CycleDetected,

    /// The configured page limit was reached
    PageLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exhausted => "no further pages",
            Self::CycleDetected => "pagination cycle detected",
            Self::PageLimit => "page limit reached",
        };
        write!(f, "{}", s)
    }
}

/// Products gathered by one crawl, unique by `pid`
///
/// Iteration is ordered by `pid`, which keeps notifications and state files
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    products: BTreeMap<String, Product>,

    /// Number of listing pages fetched
    pub pages_fetched: u32,

    /// Why pagination stopped
    pub stop_reason: StopReason,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a product, replacing any earlier record with the same `pid`
    ///
    /// Returns true if the id was not present before.
    pub fn insert(&mut self, product: Product) -> bool {
        self.products
            .insert(product.pid.clone(), product)
            .is_none()
    }

    /// Inserts every product, last one wins on repeated ids
    pub fn extend<I: IntoIterator<Item = Product>>(&mut self, products: I) {
        for product in products {
            self.insert(product);
        }
    }

    pub fn get(&self, pid: &str) -> Option<&Product> {
        self.products.get(pid)
    }

    pub fn contains(&self, pid: &str) -> bool {
        self.products.contains_key(pid)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Values<'_, String, Product> {
        self.products.values()
    }
}

impl FromIterator<Product> for CrawlResult {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl<'a> IntoIterator for &'a CrawlResult {
    type Item = &'a Product;
    type IntoIter = Values<'a, String, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
