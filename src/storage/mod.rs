//! Storage module for persisting the seen set
//!
//! This module handles the only state that outlives a run:
//! - Loading previously seen product ids, tolerating missing or corrupt files
//! - Writing the updated set back atomically (temp file + rename)

mod json;
mod traits;

pub use json::{load_seen, save_seen, JsonStateStore};
pub use traits::{StateStore, StorageError, StorageResult};
