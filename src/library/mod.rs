//! Consistency layer
//!
//! The `Library` façade mediates between the authoritative remote store and
//! the local fallback snapshot. Reads degrade to cached data rather than
//! failing; writes are remote-first and never fall back to a local insert.

pub mod migration;

pub use migration::{MigrationOutcome, Migrator};

use std::sync::Arc;
use tracing::warn;

use crate::cache::LocalCache;
use crate::remote::{AddOutcome, MediaDraft, MediaItem, MediaStore, StoreError};

/// Façade over the remote store and the local fallback snapshot
pub struct Library {
    store: Arc<dyn MediaStore>,
    cache: Arc<LocalCache>,
}

impl Library {
    /// Create a library over an explicitly constructed store client.
    ///
    /// The store is injected rather than lazily constructed so tests can
    /// substitute an in-memory fake.
    pub fn new(store: Arc<dyn MediaStore>, cache: Arc<LocalCache>) -> Self {
        Self { store, cache }
    }

    /// The collection, in the store's addition order.
    ///
    /// On transport failure, serves the last local snapshot instead (empty
    /// if absent or corrupt). The caller never sees an error; the product
    /// favors showing something over a hard failure. Successful remote
    /// reads do not touch the local cache.
    pub async fn list(&self) -> Vec<MediaItem> {
        match self.store.list().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Remote list failed, serving local snapshot");
                self.cache.read_snapshot()
            }
        }
    }

    /// Submit a draft to the remote store.
    ///
    /// A natural-key collision resolves to [`AddOutcome::Conflict`] with no
    /// mutation. A transport failure is an error (logged) and never becomes
    /// a local-only insert: items count as added only once the
    /// authoritative store accepted them.
    pub async fn add(&self, draft: &MediaDraft) -> Result<AddOutcome, StoreError> {
        match self.store.create(draft).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(key = %draft.natural_key(), error = %e, "Failed to add media item");
                Err(e)
            }
        }
    }

    /// Delete by surrogate id. Absence of the id counts as success;
    /// returns false only when the store call itself failed.
    pub async fn remove(&self, id: &str) -> bool {
        match self.store.delete(id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(id = id, error = %e, "Failed to delete media item");
                false
            }
        }
    }

    pub(crate) fn cache(&self) -> &LocalCache {
        &self.cache
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeStore;
    use super::*;
    use std::sync::atomic::Ordering;

    fn test_library() -> (tempfile::TempDir, Arc<FakeStore>, Library) {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(LocalCache::with_dir(dir.path().to_path_buf()).unwrap());
        let store = Arc::new(FakeStore::new());
        let library = Library::new(store.clone(), cache);
        (dir, store, library)
    }

    #[tokio::test]
    async fn test_add_is_idempotent_on_natural_key() {
        let (_dir, _store, library) = test_library();
        let draft = MediaDraft::movie("tt0111161", "The Shawshank Redemption", "1994", "p.jpg");

        let first = library.add(&draft).await.unwrap();
        let item = match first {
            AddOutcome::Added(item) => item,
            AddOutcome::Conflict => panic!("first add must succeed"),
        };
        assert!(!item.id.is_empty());

        // Second add with the same natural key resolves to Conflict
        let second = library.add(&draft).await.unwrap();
        assert_eq!(second, AddOutcome::Conflict);

        let listed = library.list().await;
        let matching: Vec<_> = listed
            .iter()
            .filter(|i| i.natural_key() == draft.natural_key())
            .collect();
        assert_eq!(matching.len(), 1);
    }

    #[tokio::test]
    async fn test_add_failure_never_inserts_locally() {
        let (_dir, store, library) = test_library();
        store.unreachable.store(true, Ordering::Relaxed);

        let draft = MediaDraft::movie("tt0068646", "The Godfather", "1972", "g.jpg");
        let result = library.add(&draft).await;
        assert!(result.is_err());

        // Neither the store nor the local snapshot gained the item
        assert!(store.items().is_empty());
        assert!(library.cache().read_snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_list_falls_back_to_snapshot() {
        let (_dir, store, library) = test_library();

        // Seed a legacy snapshot, then make the store unreachable
        let draft = MediaDraft::series("121361", "Game of Thrones", "2011", "got.jpg");
        store.seed(&draft);
        let snapshot = store.items();
        library.cache().write_snapshot(&snapshot).unwrap();

        store.unreachable.store(true, Ordering::Relaxed);
        let listed = library.list().await;
        assert_eq!(listed, snapshot);
    }

    #[tokio::test]
    async fn test_list_with_no_snapshot_is_empty_not_error() {
        let (_dir, store, library) = test_library();
        store.unreachable.store(true, Ordering::Relaxed);
        assert!(library.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_absent_id_is_success() {
        let (_dir, _store, library) = test_library();
        assert!(library.remove("no-such-id").await);
    }

    #[tokio::test]
    async fn test_remove_reports_transport_failure() {
        let (_dir, store, library) = test_library();
        store.unreachable.store(true, Ordering::Relaxed);
        assert!(!library.remove("some-id").await);
    }
}
