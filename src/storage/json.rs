//! JSON file storage for the seen set
//!
//! ## File Layout
//!
//! ```text
//! {
//!   "seen_ids": ["1001", "1002"],
//!   "updated_at": "2026-10-17T07:00:00Z"
//! }
//! ```
//!
//! Only `seen_ids` is read back; any other field is ignored.

use crate::state::SeenSet;
use crate::storage::traits::{StateStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct StoredState {
    #[serde(default)]
    seen_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct StateSnapshot<'a> {
    seen_ids: Vec<&'a str>,
    updated_at: DateTime<Utc>,
}

/// Seen-set store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path used for the write-then-rename
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> SeenSet {
        load_seen(&self.path)
    }

    fn save(&self, seen: &SeenSet) -> StorageResult<()> {
        let snapshot = StateSnapshot {
            seen_ids: seen.iter().map(String::as_str).collect(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        let write = |target: &Path| -> std::io::Result<()> {
            let mut file = File::create(target)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()
        };

        if let Err(source) = write(&temp).and_then(|_| fs::rename(&temp, &self.path)) {
            let _ = fs::remove_file(&temp);
            return Err(StorageError::Write {
                path: self.path.display().to_string(),
                source,
            });
        }

        tracing::debug!(
            "Saved {} seen id(s) to {}",
            seen.len(),
            self.path.display()
        );

        Ok(())
    }
}

/// Loads the seen set from `path`
///
/// A missing, unreadable or malformed file, or one without `seen_ids`, yields an
/// empty set.
pub fn load_seen(path: &Path) -> SeenSet {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No state file at {}, starting empty", path.display());
            return SeenSet::new();
        }
        Err(e) => {
            tracing::warn!(
                "Could not read state file {}: {}; starting empty",
                path.display(),
                e
            );
            return SeenSet::new();
        }
    };

    match serde_json::from_str::<StoredState>(&content) {
        Ok(stored) => stored.seen_ids.into_iter().collect(),
        Err(e) => {
            tracing::warn!(
                "Malformed state file {}: {}; starting empty",
                path.display(),
                e
            );
            SeenSet::new()
        }
    }
}

/// Atomically replaces the state file at `path` with `seen`
pub fn save_seen(path: &Path, seen: &SeenSet) -> StorageResult<()> {
    JsonStateStore::new(path).save(seen)
}
