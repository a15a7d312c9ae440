//! Storage traits and error types
//!
//! This module defines the trait interface for seen-set storage backends and
//! associated error types.

use crate::state::SeenSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for seen-set storage backends
///
/// Loading never fails: a backend that cannot produce a usable set reports it in
/// its logs and hands back an empty one. Saving replaces the stored set as a
/// whole.
pub trait StateStore {
    /// Loads the ids recorded by previous runs
    fn load(&self) -> SeenSet;

    /// Replaces the stored ids with `seen`
    fn save(&self, seen: &SeenSet) -> StorageResult<()>;
}
