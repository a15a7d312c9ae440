//! URL handling module for Brand-Watcher
//!
//! This module turns the hrefs found in listing markup into absolute URLs and
//! derives the keys the crawler uses to recognise pages it already visited.

mod resolve;

// Re-export main functions
pub use resolve::{absolutize, has_network_location, link_url, visit_key};
