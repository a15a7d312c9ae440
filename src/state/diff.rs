//! Diff calculation between a crawl and the seen set
//!
//! Additions only: ids that vanished from the listing are never reported and
//! never removed from the seen set.

use crate::state::{CrawlResult, Product, SeenSet};

/// Outcome of diffing one crawl against the seen set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Products whose id was not in the seen set, ordered by id
    pub new_items: Vec<Product>,

    /// Previous ids plus every id from the crawl
    pub updated_seen: SeenSet,
}

impl DiffResult {
    pub fn has_new_items(&self) -> bool {
        !self.new_items.is_empty()
    }
}

/// Computes new products and the updated seen set
///
/// Pure function: the inputs are left untouched.
pub fn diff(current: &CrawlResult, seen: &SeenSet) -> DiffResult {
    let new_items: Vec<Product> = current
        .iter()
        .filter(|product| !seen.contains(&product.pid))
        .cloned()
        .collect();

    let updated_seen = seen.union(&current.ids().collect());

    DiffResult {
        new_items,
        updated_seen,
    }
}
