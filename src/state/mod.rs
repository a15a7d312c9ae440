//! State module for tracking what the watcher has seen
//!
//! This module provides the values that flow through a single run and the set
//! that survives between runs.
//!
//! # Components
//!
//! - `Product`: one listing entry, identified by its product id
//! - `CrawlResult`: the products collected by one crawl, deduplicated by id
//! - `SeenSet`: every product id observed by previous runs
//! - `diff`: set subtraction of a crawl against the seen set

mod diff;
mod product;
mod seen;

// Re-export main types
pub use diff::{diff, DiffResult};
pub use product::{CrawlResult, Product, StopReason};
pub use seen::SeenSet;
