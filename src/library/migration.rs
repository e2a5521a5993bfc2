//! One-shot migration of legacy local data
//!
//! Moves the legacy local snapshot into the remote store, at most once per
//! client. Gated by a persisted completion flag, with a persisted set of
//! already-migrated natural keys so an aborted run resumes where it left
//! off instead of re-driving transferred items.

use std::sync::Arc;
use tracing::{info, warn};

use super::Library;
use crate::remote::AddOutcome;

/// Result of a migration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Nothing to do: no legacy data, or the flag is already set
    NotNeeded,
    /// Every legacy record was processed; the flag is now set
    Completed { migrated: usize, skipped: usize },
    /// A store failure aborted the run; the flag remains unset and the
    /// next run resumes from the recorded keys
    Aborted { migrated: usize, remaining: usize },
}

/// Drives the one-shot legacy migration through [`Library::add`].
///
/// Assumes it is the only runner per client lifetime. Concurrent runners
/// can both observe the flag unset and re-drive the same items; that is
/// safe only because the store deduplicates on the natural key. The
/// recorded-keys set is per-client defense in depth, not a cross-client
/// guarantee.
pub struct Migrator {
    library: Arc<Library>,
}

impl Migrator {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    /// Run the migration if it is still pending.
    ///
    /// Each legacy record goes through `add`: a conflict means the store
    /// already holds it and counts as migrated; a transport failure aborts
    /// the remaining loop without setting the flag.
    pub async fn run(&self) -> MigrationOutcome {
        let cache = self.library.cache();

        if cache.is_synced() {
            return MigrationOutcome::NotNeeded;
        }

        let legacy = cache.read_snapshot();
        if legacy.is_empty() {
            return MigrationOutcome::NotNeeded;
        }

        info!(count = legacy.len(), "Starting legacy snapshot migration");
        let done_keys = cache.migrated_keys();
        let mut migrated = 0usize;
        let mut skipped = 0usize;

        for (index, item) in legacy.iter().enumerate() {
            let key = item.natural_key();
            if done_keys.contains(&key) {
                skipped += 1;
                continue;
            }

            match self.library.add(&item.to_draft()).await {
                Ok(AddOutcome::Added(_)) => {
                    migrated += 1;
                    self.record(&key);
                }
                Ok(AddOutcome::Conflict) => {
                    // Already present remotely, counts as migrated
                    skipped += 1;
                    self.record(&key);
                }
                Err(e) => {
                    let remaining = legacy.len() - index;
                    warn!(
                        key = %key,
                        error = %e,
                        remaining = remaining,
                        "Migration aborted, will retry on next launch"
                    );
                    return MigrationOutcome::Aborted { migrated, remaining };
                }
            }
        }

        if let Err(e) = cache.mark_synced() {
            // Flag stays unset; the next run is a cheap no-op thanks to
            // the recorded keys
            warn!(error = %e, "Failed to persist migration flag");
        }

        info!(migrated = migrated, skipped = skipped, "Legacy migration complete");
        MigrationOutcome::Completed { migrated, skipped }
    }

    fn record(&self, key: &str) {
        if let Err(e) = self.library.cache().record_migrated(key) {
            warn!(key = key, error = %e, "Failed to record migrated key");
        }
    }
}
