//! # Snapshot Cache
//!
//! Persists the last known-good product list as a single JSON blob and
//! restores it when the remote catalog is unreachable.
//!
//! ## Snapshot Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Snapshot Lifecycle                                 │
//! │                                                                         │
//! │  WRITE: after every successful full page-merge                         │
//! │  ──────                                                                │
//! │  engine merge ok ──► save(items) ──► <file>.tmp ──► rename ──► <file>  │
//! │                        (whole list, overwritten wholesale)             │
//! │                                                                         │
//! │  READ: only while the in-memory list is empty                          │
//! │  ─────                                                                 │
//! │  cold start ─────────┐                                                 │
//! │                      ├──► load() ──► Some(items) | None                │
//! │  failed fetch ───────┘          (missing/corrupt file = None)          │
//! │                                                                         │
//! │  The snapshot is a point-in-time copy: favorite flags reflect the      │
//! │  favorite set at save time, not at load time.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use vitrina_core::Product;

use crate::error::{CacheError, CacheResult};

// =============================================================================
// Local Snapshot
// =============================================================================

/// The on-disk snapshot format: the full published item list plus the
/// moment it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSnapshot {
    /// Products exactly as published at save time, favorite overlay included.
    pub items: Vec<Product>,

    /// When this snapshot was written.
    pub saved_at: DateTime<Utc>,
}

// =============================================================================
// Snapshot Cache
// =============================================================================

/// File-backed snapshot store.
///
/// Writes are idempotent whole-file overwrites; concurrent writers are
/// allowed and the last one wins. The temp-file + rename dance means a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    /// Creates a cache backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotCache { path: path.into() }
    }

    /// The snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Persists the full item list, best-effort.
    ///
    /// Failures are logged and swallowed: snapshot persistence must never
    /// fail the user-visible operation that triggered it.
    pub async fn save(&self, items: &[Product]) {
        if let Err(e) = self.try_save(items).await {
            warn!(path = %self.path.display(), error = %e, "Failed to persist catalog snapshot");
        }
    }

    /// Persists the full item list, surfacing the cause on failure.
    pub async fn try_save(&self, items: &[Product]) -> CacheResult<()> {
        let snapshot = LocalSnapshot {
            items: items.to_vec(),
            saved_at: Utc::now(),
        };
        let blob = serde_json::to_vec(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a sibling temp file, then rename over the target. Rename
        // is atomic on the same filesystem, so readers see either the old
        // snapshot or the new one, never a torn blob.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &blob).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(
            path = %self.path.display(),
            count = snapshot.items.len(),
            "Catalog snapshot saved"
        );
        Ok(())
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Restores the last snapshot's items, or `None` when there is nothing
    /// usable on disk. Never fails: a corrupt snapshot is treated as a miss.
    pub async fn load(&self) -> Option<Vec<Product>> {
        self.load_snapshot().await.map(|s| s.items)
    }

    /// Restores the full snapshot including its timestamp.
    pub async fn load_snapshot(&self) -> Option<LocalSnapshot> {
        match self.try_load().await {
            Ok(snapshot) => {
                debug!(
                    path = %self.path.display(),
                    count = snapshot.items.len(),
                    saved_at = %snapshot.saved_at,
                    "Catalog snapshot restored"
                );
                Some(snapshot)
            }
            Err(e) if e.is_missing_file() => {
                debug!(path = %self.path.display(), "No catalog snapshot on disk");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable catalog snapshot");
                None
            }
        }
    }

    /// Restores the snapshot, surfacing the cause on failure.
    pub async fn try_load(&self) -> CacheResult<LocalSnapshot> {
        let blob = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&blob)?)
    }

    /// Removes the snapshot file if present. Used when a user signs out and
    /// the point-in-time favorite flags stop being theirs.
    pub async fn clear(&self) {
        match fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "Catalog snapshot cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to clear catalog snapshot"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vitrina_core::ProductRecord;

    fn temp_cache() -> SnapshotCache {
        let dir = std::env::temp_dir()
            .join("vitrina-cache-tests")
            .join(uuid::Uuid::new_v4().to_string());
        SnapshotCache::new(dir.join("catalog_snapshot.json"))
    }

    fn product(id: &str, name: &str, favorite: bool) -> Product {
        Product::from_record(
            ProductRecord {
                id: id.into(),
                name: name.into(),
                description: format!("{name} description"),
                images: vec![format!("https://img/{id}.png")],
            },
            favorite,
        )
    }

    #[tokio::test]
    async fn test_round_trip_preserves_every_field() {
        let cache = temp_cache();
        let items = vec![product("p1", "Kettle", true), product("p2", "Mug", false)];

        cache.save(&items).await;
        let restored = cache.load().await.expect("snapshot should exist");

        // Field-for-field equality, favorite flags as of save time included.
        assert_eq!(restored, items);
    }

    #[tokio::test]
    async fn test_missing_file_is_a_silent_miss() {
        let cache = temp_cache();
        assert!(cache.load().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_a_silent_miss() {
        let cache = temp_cache();
        fs::create_dir_all(cache.path().parent().unwrap())
            .await
            .unwrap();
        fs::write(cache.path(), b"{ definitely not a snapshot")
            .await
            .unwrap();

        assert!(cache.load().await.is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_wholesale() {
        let cache = temp_cache();
        cache.save(&[product("p1", "Kettle", false)]).await;
        cache.save(&[product("p2", "Mug", true)]).await;

        let restored = cache.load().await.unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].id, "p2");
    }

    #[tokio::test]
    async fn test_snapshot_carries_timestamp() {
        let cache = temp_cache();
        let before = Utc::now();
        cache.save(&[product("p1", "Kettle", false)]).await;

        let snapshot = cache.load_snapshot().await.unwrap();
        assert!(snapshot.saved_at >= before);
        assert!(snapshot.saved_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_clear_removes_snapshot() {
        let cache = temp_cache();
        cache.save(&[product("p1", "Kettle", false)]).await;
        cache.clear().await;
        assert!(cache.load().await.is_none());

        // Clearing an already-missing snapshot is fine.
        cache.clear().await;
    }
}
