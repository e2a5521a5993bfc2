//! Local Snapshot Store
//!
//! Persists three fixed keys under the user cache directory: the serialized
//! media snapshot, the migration-completed flag, and the set of natural keys
//! already migrated. Writes are atomic (temp file + rename); a snapshot that
//! fails to parse is treated as absent, never as an error.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::remote::MediaItem;

/// Fixed key for the serialized media snapshot
const SNAPSHOT_KEY: &str = "seen-media-list";

/// Fixed key for the migration-completed flag
const SYNCED_KEY: &str = "synced-to-db";

/// Fixed key for the set of already-migrated natural keys
const MIGRATED_KEYS_KEY: &str = "migrated-keys";

/// Local key/value store backed by files in the cache directory
pub struct LocalCache {
    /// Directory holding one file per key
    dir: PathBuf,
}

impl LocalCache {
    /// Open the cache in the platform cache directory
    pub fn open() -> Result<Self> {
        let dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("seenlist");
        Self::with_dir(dir)
    }

    /// Open the cache in a specific directory
    pub fn with_dir(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory: {:?}", dir))?;

        info!(cache_dir = %dir.display(), "Local cache initialized");
        Ok(Self { dir })
    }

    /// Last snapshot of the collection.
    ///
    /// Absent or corrupt data yields an empty list; corruption is logged
    /// and swallowed so reads can always degrade to something.
    pub fn read_snapshot(&self) -> Vec<MediaItem> {
        let path = self.key_path(SNAPSHOT_KEY);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(_) => {
                debug!(key = SNAPSHOT_KEY, "No local snapshot present");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(items) => items,
            Err(e) => {
                warn!(key = SNAPSHOT_KEY, error = %e, "Snapshot failed to parse, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace the snapshot (last-write-wins, no versioning)
    pub fn write_snapshot(&self, items: &[MediaItem]) -> Result<()> {
        let data = serde_json::to_vec(items).context("Failed to serialize snapshot")?;
        self.write_atomic(SNAPSHOT_KEY, &data)?;
        debug!(key = SNAPSHOT_KEY, count = items.len(), "Stored local snapshot");
        Ok(())
    }

    /// Whether legacy local data has been fully transferred to the store
    pub fn is_synced(&self) -> bool {
        fs::read_to_string(self.key_path(SYNCED_KEY))
            .map(|s| s.trim() == "true")
            .unwrap_or(false)
    }

    /// Permanently mark the one-time migration as complete
    pub fn mark_synced(&self) -> Result<()> {
        self.write_atomic(SYNCED_KEY, b"true")?;
        info!(key = SYNCED_KEY, "Migration flag set");
        Ok(())
    }

    /// Natural keys already transferred by a previous migration run.
    ///
    /// Corrupt data yields an empty set; the migration then re-drives items
    /// and relies on the store's conflict detection.
    pub fn migrated_keys(&self) -> HashSet<String> {
        let path = self.key_path(MIGRATED_KEYS_KEY);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(_) => return HashSet::new(),
        };

        match serde_json::from_slice(&data) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(key = MIGRATED_KEYS_KEY, error = %e, "Migrated-keys set failed to parse, treating as empty");
                HashSet::new()
            }
        }
    }

    /// Record a natural key as transferred, so a partial run resumes
    /// instead of re-driving it
    pub fn record_migrated(&self, natural_key: &str) -> Result<()> {
        let mut keys = self.migrated_keys();
        if !keys.insert(natural_key.to_string()) {
            return Ok(());
        }
        let data = serde_json::to_vec(&keys).context("Failed to serialize migrated keys")?;
        self.write_atomic(MIGRATED_KEYS_KEY, &data)?;
        debug!(key = natural_key, "Recorded migrated natural key");
        Ok(())
    }

    /// Write a key's value atomically using a temp file in the same directory
    fn write_atomic(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.key_path(key);
        let parent = path.parent().unwrap_or(Path::new("/tmp"));

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .context("Failed to create temp file for cache write")?;
        tmp.write_all(data).context("Failed to write cache value")?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to persist cache value: {:?}", path))?;
        Ok(())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Get the cache directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
