//! # Catalog Engine
//!
//! Main orchestrator of the catalog sync layer. Reconciles the paginated
//! remote catalog, the per-user favorite-id set, and the on-disk snapshot
//! into one published [`CatalogViewState`].
//!
//! ## Engine Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CatalogEngine Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                        CatalogEngine                             │  │
//! │  │                                                                  │  │
//! │  │  • Guards against duplicate in-flight page loads                 │  │
//! │  │  • Overlays favorite flags onto fetched records                  │  │
//! │  │  • Applies optimistic toggles with rollback                      │  │
//! │  │  • Persists/hydrates the fallback snapshot                       │  │
//! │  │  • Emits every state change to subscribed observers              │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │RemoteCatalog-  │  │FavoriteSet-    │  │   SnapshotCache        │    │
//! │  │Source          │  │Source          │  │                        │    │
//! │  │                │  │                │  │ Saved after every      │    │
//! │  │ (name,id)-     │  │ Presence-keyed │  │ merge; hydrated only   │    │
//! │  │ ordered pages  │  │ id collection  │  │ while items is empty   │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  SERIALIZATION:                                                        │
//! │  ──────────────                                                        │
//! │  One tokio Mutex (EngineInner) is held across every multi-step         │
//! │  read-modify-write, so load_next_page and toggle_favorite never        │
//! │  interleave and page N+1 is never requested before page N merged.      │
//! │  The published state sits in an RwLock and is only touched briefly.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use vitrina_cache::SnapshotCache;
use vitrina_core::{search, CatalogViewState, ErrorKind, PageCursor, Product};

use crate::config::CatalogConfig;
use crate::error::{ConfigError, SyncResult};
use crate::source::{FavoriteSetSource, RemoteCatalogSource, UserSession};

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Trait for publishing state changes to observers (implemented by UI glue).
///
/// A single shared engine emits here so every screen observes the same
/// published state instead of constructing its own engine and duplicating
/// fetches.
pub trait CatalogEventEmitter: Send + Sync {
    /// Called after every change to the published state.
    fn state_changed(&self, state: &CatalogViewState);
}

/// No-op event emitter for tests and headless use.
pub struct NoOpEmitter;

impl CatalogEventEmitter for NoOpEmitter {
    fn state_changed(&self, _state: &CatalogViewState) {}
}

// =============================================================================
// Engine Internals
// =============================================================================

/// Serialized engine internals. Everything here is only touched while the
/// inner mutex is held.
struct EngineInner {
    /// Continuation token of the last merged page.
    cursor: Option<PageCursor>,

    /// Cached favorite-id set; `None` means absent or invalidated, and the
    /// next load refetches it.
    favorite_ids: Option<HashSet<String>>,

    /// True while `items` holds a restored snapshot rather than fetched
    /// pages. The first successful page-one merge replaces such items
    /// instead of appending, which keeps ids unique.
    hydrated: bool,
}

// =============================================================================
// Catalog Engine
// =============================================================================

/// The catalog sync engine. One instance is meant to be shared behind an
/// `Arc` by every screen that observes the catalog.
pub struct CatalogEngine {
    config: CatalogConfig,

    /// When set, non-favorite records are dropped at merge time and an
    /// un-favorite toggle triggers a full reload.
    only_favorite: bool,

    remote: Arc<dyn RemoteCatalogSource>,
    favorites: Arc<dyn FavoriteSetSource>,
    cache: Option<SnapshotCache>,
    session: Arc<dyn UserSession>,
    emitter: Arc<dyn CatalogEventEmitter>,

    /// Published state, cloned out to observers.
    state: Arc<RwLock<CatalogViewState>>,

    /// Serialization context for multi-step mutations.
    inner: Mutex<EngineInner>,

    /// Bumped by `shutdown`; a fetch that finishes under a stale generation
    /// still writes the snapshot but publishes nothing.
    generation: AtomicU64,
}

impl CatalogEngine {
    /// Starts building an engine.
    pub fn builder(config: CatalogConfig) -> CatalogEngineBuilder {
        CatalogEngineBuilder::new(config)
    }

    /// Returns a copy of the current published state.
    pub async fn state(&self) -> CatalogViewState {
        self.state.read().await.clone()
    }

    /// Whether this engine serves the favorites-only view.
    pub fn only_favorite(&self) -> bool {
        self.only_favorite
    }

    // =========================================================================
    // Snapshot Restore (cold start)
    // =========================================================================

    /// Adopts the on-disk snapshot while nothing has been loaded yet.
    ///
    /// Called once at cold start so the catalog renders before the first
    /// fetch completes. A later successful page-one merge replaces the
    /// restored items wholesale.
    pub async fn restore_snapshot(&self) {
        let Some(cache) = &self.cache else { return };

        let mut inner = self.inner.lock().await;
        if !self.state.read().await.items.is_empty() {
            return;
        }
        let Some(items) = cache.load().await else {
            return;
        };
        if items.is_empty() {
            return;
        }

        info!(count = items.len(), "Restored catalog snapshot at cold start");
        inner.hydrated = true;
        {
            let mut state = self.state.write().await;
            state.items = items;
        }
        drop(inner);
        self.publish().await;
    }

    // =========================================================================
    // Page Loading
    // =========================================================================

    /// Loads and merges the next catalog page.
    ///
    /// Returns immediately without touching the network when a load is
    /// already in flight or the end of the catalog was reached. This is the
    /// single-flight guard that coalesces double-fired scroll prefetches.
    pub async fn load_next_page(&self) -> SyncResult<()> {
        // Flip Idle → Loading atomically, or bail.
        {
            let mut state = self.state.write().await;
            if state.is_loading || state.is_end_reached {
                debug!(
                    is_loading = state.is_loading,
                    is_end_reached = state.is_end_reached,
                    "Skipping page load"
                );
                return Ok(());
            }
            state.is_loading = true;
            state.error = None;
        }
        self.publish().await;

        let generation = self.generation.load(Ordering::Acquire);
        let mut inner = self.inner.lock().await;

        match self.fetch_and_merge(&mut inner, generation).await {
            Ok(live) => {
                drop(inner);
                if live {
                    self.publish().await;
                }
                Ok(())
            }
            Err(kind) => {
                warn!(error = %kind, "Catalog page load failed");
                let hydrate = {
                    let mut state = self.state.write().await;
                    state.is_loading = false;
                    state.error = Some(kind.clone());
                    state.items.is_empty()
                };
                if hydrate {
                    self.hydrate_after_failure(&mut inner).await;
                }
                drop(inner);
                if self.generation.load(Ordering::Acquire) == generation {
                    self.publish().await;
                }
                Err(kind)
            }
        }
    }

    /// Fetches favorites (if stale) and the next page, merges, persists.
    ///
    /// Returns `Ok(true)` when the merge was published, `Ok(false)` when the
    /// generation went stale mid-flight and only the snapshot was written.
    async fn fetch_and_merge(&self, inner: &mut EngineInner, generation: u64) -> SyncResult<bool> {
        let user_id = self
            .session
            .current_user_id()
            .ok_or(ErrorKind::Unauthenticated)?;

        // Step 1: favorite-id set, refetched only when absent or invalidated.
        let favorite_ids = match inner.favorite_ids.clone() {
            Some(ids) => ids,
            None => {
                let ids = self
                    .with_timeout(self.favorites.fetch_favorite_ids(&user_id))
                    .await?;
                debug!(count = ids.len(), "Fetched favorite id set");
                inner.favorite_ids = Some(ids.clone());
                ids
            }
        };

        // Step 2: next catalog page.
        let page_size = self.config.page_size();
        let page = self
            .with_timeout(self.remote.fetch_page(inner.cursor.clone(), page_size))
            .await?;
        let raw_len = page.raw_len;

        // Step 3: overlay and filter.
        let mut fresh: Vec<Product> = page
            .records
            .into_iter()
            .map(|record| {
                let favorite = favorite_ids.contains(&record.id);
                Product::from_record(record, favorite)
            })
            .collect();
        if self.only_favorite {
            fresh.retain(|p| p.favorite);
        }

        // Restored snapshot items are provisional: page one replaces them.
        let replacing = inner.hydrated && inner.cursor.is_none();
        let merged: Vec<Product> = if replacing {
            fresh
        } else {
            let state = self.state.read().await;
            let mut merged = state.items.clone();
            merged.extend(fresh);
            merged
        };

        // The fetch-to-cache path completes even when the observer is gone.
        if let Some(cache) = &self.cache {
            cache.save(&merged).await;
        }

        if self.generation.load(Ordering::Acquire) != generation {
            debug!("Discarding page merge for a stale generation");
            let mut state = self.state.write().await;
            state.is_loading = false;
            return Ok(false);
        }

        if let Some(next) = page.next_cursor {
            inner.cursor = Some(next);
        }
        inner.hydrated = false;
        let is_end_reached = raw_len < page_size;

        let total = merged.len();
        {
            let mut state = self.state.write().await;
            state.items = merged;
            state.is_end_reached = is_end_reached;
            state.is_loading = false;
        }
        info!(raw_len, total, is_end_reached, "Catalog page merged");
        Ok(true)
    }

    /// Adopts the snapshot after a failed fetch left `items` empty. The
    /// reported error stays in place; the snapshot is a stopgap, not a
    /// recovery.
    async fn hydrate_after_failure(&self, inner: &mut EngineInner) {
        let Some(cache) = &self.cache else { return };
        let Some(items) = cache.load().await else {
            return;
        };
        if items.is_empty() {
            return;
        }

        let mut state = self.state.write().await;
        if state.items.is_empty() {
            info!(count = items.len(), "Hydrating catalog from snapshot after failed fetch");
            state.items = items;
            inner.hydrated = true;
        }
    }

    // =========================================================================
    // Favorite Toggling
    // =========================================================================

    /// Toggles the favorite flag of a loaded product: flips it locally,
    /// commits the single remote write, and rolls the flip back if the
    /// write fails.
    pub async fn toggle_favorite(&self, product_id: &str) -> SyncResult<()> {
        let Some(user_id) = self.session.current_user_id() else {
            {
                let mut state = self.state.write().await;
                state.error = Some(ErrorKind::Unauthenticated);
            }
            self.publish().await;
            return Err(ErrorKind::Unauthenticated);
        };

        let mut inner = self.inner.lock().await;

        // The product must still be loaded; a toggle for anything else is a
        // no-op surfaced only to the caller.
        let (was_favorite, record) = {
            let state = self.state.read().await;
            match state.product(product_id) {
                Some(product) => (product.favorite, product.to_record()),
                None => {
                    debug!(product_id, "Toggle for a product no longer loaded");
                    return Err(ErrorKind::NotFound(product_id.to_string()));
                }
            }
        };

        // Optimistic flip, visible before the remote write settles.
        self.set_favorite_flag(product_id, !was_favorite).await;
        self.publish().await;

        let result = if was_favorite {
            self.with_timeout(self.favorites.remove_favorite(&user_id, product_id))
                .await
        } else {
            self.with_timeout(self.favorites.add_favorite(&user_id, &record))
                .await
        };

        match result {
            Ok(()) => {
                debug!(product_id, favorite = !was_favorite, "Favorite toggle committed");
                inner.favorite_ids = None;
                let needs_reload = self.only_favorite && was_favorite;
                drop(inner);

                if needs_reload {
                    // A favorites-only view cannot just drop the item: later
                    // pages may need to re-flow into the loaded window.
                    self.reload_favorites().await
                } else {
                    Ok(())
                }
            }
            Err(kind) => {
                warn!(product_id, error = %kind, "Favorite toggle failed, rolling back");
                self.set_favorite_flag(product_id, was_favorite).await;
                {
                    let mut state = self.state.write().await;
                    state.error = Some(kind.clone());
                }
                drop(inner);
                self.publish().await;
                Err(kind)
            }
        }
    }

    async fn set_favorite_flag(&self, product_id: &str, favorite: bool) {
        let mut state = self.state.write().await;
        if let Some(product) = state.items.iter_mut().find(|p| p.id == product_id) {
            product.favorite = favorite;
        }
    }

    // =========================================================================
    // Full Reload
    // =========================================================================

    /// Resets pagination and reloads from page one.
    ///
    /// Used when patching the loaded window locally cannot represent the new
    /// state and recomputing is cheaper than reconciling.
    pub async fn reload_favorites(&self) -> SyncResult<()> {
        info!("Reloading catalog from page one");
        {
            let mut inner = self.inner.lock().await;
            inner.cursor = None;
            inner.favorite_ids = None;
            inner.hydrated = false;
            let mut state = self.state.write().await;
            state.items.clear();
            state.is_end_reached = false;
            state.error = None;
        }
        self.publish().await;
        self.load_next_page().await
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Case-insensitive substring filter over the loaded items, original
    /// order preserved. Pure: no I/O, no pagination effects.
    pub async fn search(&self, query: &str) -> Vec<Product> {
        let state = self.state.read().await;
        search::filter_by_name(&state.items, query)
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Marks every in-flight fetch stale. The fetch still completes its
    /// write-to-snapshot path, but nothing is published to the discarded
    /// observer.
    pub fn shutdown(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        debug!("Catalog engine shut down; late results will not be published");
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn publish(&self) {
        let state = self.state.read().await.clone();
        self.emitter.state_changed(&state);
    }

    async fn with_timeout<T, F>(&self, fut: F) -> SyncResult<T>
    where
        F: Future<Output = SyncResult<T>>,
    {
        match tokio::time::timeout(self.config.fetch_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(ErrorKind::Timeout(self.config.catalog.fetch_timeout_secs)),
        }
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating a [`CatalogEngine`] with its collaborators.
pub struct CatalogEngineBuilder {
    config: CatalogConfig,
    only_favorite: bool,
    remote: Option<Arc<dyn RemoteCatalogSource>>,
    favorites: Option<Arc<dyn FavoriteSetSource>>,
    cache: Option<SnapshotCache>,
    session: Option<Arc<dyn UserSession>>,
    emitter: Option<Arc<dyn CatalogEventEmitter>>,
}

impl CatalogEngineBuilder {
    /// Creates a new builder with the given config.
    pub fn new(config: CatalogConfig) -> Self {
        CatalogEngineBuilder {
            config,
            only_favorite: false,
            remote: None,
            favorites: None,
            cache: None,
            session: None,
            emitter: None,
        }
    }

    /// Serves the favorites-only view.
    pub fn only_favorite(mut self, only_favorite: bool) -> Self {
        self.only_favorite = only_favorite;
        self
    }

    /// Sets the remote catalog source.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteCatalogSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Sets the favorite collection source.
    pub fn with_favorites(mut self, favorites: Arc<dyn FavoriteSetSource>) -> Self {
        self.favorites = Some(favorites);
        self
    }

    /// Sets an explicit snapshot cache, overriding the configured path.
    pub fn with_cache(mut self, cache: SnapshotCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the session supplying the current user id.
    pub fn with_session(mut self, session: Arc<dyn UserSession>) -> Self {
        self.session = Some(session);
        self
    }

    /// Sets the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn CatalogEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Builds the engine.
    pub fn build(self) -> Result<CatalogEngine, ConfigError> {
        self.config.validate()?;

        let remote = self
            .remote
            .ok_or_else(|| ConfigError::Invalid("remote catalog source required".into()))?;
        let favorites = self
            .favorites
            .ok_or_else(|| ConfigError::Invalid("favorite set source required".into()))?;
        let session = self
            .session
            .ok_or_else(|| ConfigError::Invalid("user session required".into()))?;
        let emitter = self.emitter.unwrap_or_else(|| Arc::new(NoOpEmitter));

        let cache = match self.cache {
            Some(cache) => Some(cache),
            None if self.config.cache.enabled => {
                self.config.cache.snapshot_path().map(SnapshotCache::new)
            }
            None => None,
        };

        Ok(CatalogEngine {
            config: self.config,
            only_favorite: self.only_favorite,
            remote,
            favorites,
            cache,
            session,
            emitter,
            state: Arc::new(RwLock::new(CatalogViewState::default())),
            inner: Mutex::new(EngineInner {
                cursor: None,
                favorite_ids: None,
                hydrated: false,
            }),
            generation: AtomicU64::new(0),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use crate::memory::InMemoryStore;
    use crate::source::StaticSession;
    use vitrina_core::ProductRecord;

    const USER: &str = "user-1";

    fn record(id: &str, name: &str) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{name} description"),
            images: vec![format!("https://img/{id}.png")],
        }
    }

    /// Seeds `count` products named "Item 01".. in stable order.
    fn seeded_store(count: usize) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        for i in 1..=count {
            store.insert_record(record(&format!("p{i:02}"), &format!("Item {i:02}")));
        }
        store
    }

    fn temp_cache() -> SnapshotCache {
        let dir = std::env::temp_dir()
            .join("vitrina-engine-tests")
            .join(uuid::Uuid::new_v4().to_string());
        SnapshotCache::new(dir.join("catalog_snapshot.json"))
    }

    fn config(page_size: usize) -> CatalogConfig {
        let mut config = CatalogConfig::default();
        config.catalog.page_size = page_size;
        config.cache.enabled = false;
        config
    }

    struct EngineOptions {
        page_size: usize,
        only_favorite: bool,
        cache: Option<SnapshotCache>,
        session: StaticSession,
        emitter: Option<Arc<dyn CatalogEventEmitter>>,
    }

    impl Default for EngineOptions {
        fn default() -> Self {
            EngineOptions {
                page_size: 10,
                only_favorite: false,
                cache: None,
                session: StaticSession::signed_in(USER),
                emitter: None,
            }
        }
    }

    fn engine(store: &Arc<InMemoryStore>, options: EngineOptions) -> Arc<CatalogEngine> {
        let mut builder = CatalogEngine::builder(config(options.page_size))
            .only_favorite(options.only_favorite)
            .with_remote(store.clone())
            .with_favorites(store.clone())
            .with_session(Arc::new(options.session));
        if let Some(cache) = options.cache {
            builder = builder.with_cache(cache);
        }
        if let Some(emitter) = options.emitter {
            builder = builder.with_emitter(emitter);
        }
        Arc::new(builder.build().expect("engine should build"))
    }

    fn item_ids(state: &CatalogViewState) -> Vec<&str> {
        state.items.iter().map(|p| p.id.as_str()).collect()
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    #[tokio::test]
    async fn test_three_pages_cover_25_products_without_duplicates() {
        let store = seeded_store(25);
        let engine = engine(&store, EngineOptions::default());

        for _ in 0..3 {
            engine.load_next_page().await.unwrap();
        }

        let state = engine.state().await;
        assert_eq!(state.items.len(), 25);
        assert!(state.is_end_reached);
        assert!(state.error.is_none());

        let unique: std::collections::HashSet<_> = item_ids(&state).into_iter().collect();
        assert_eq!(unique.len(), 25);
        assert_eq!(store.pages_fetched(), 3);

        // End reached: further loads never touch the network.
        engine.load_next_page().await.unwrap();
        assert_eq!(store.pages_fetched(), 3);
    }

    #[tokio::test]
    async fn test_items_stay_in_name_order_across_pages() {
        let store = seeded_store(25);
        let engine = engine(&store, EngineOptions::default());

        for _ in 0..3 {
            engine.load_next_page().await.unwrap();
        }

        let state = engine.state().await;
        let names: Vec<_> = state.items.iter().map(|p| p.name.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_coalesces_overlapping_loads() {
        let store = seeded_store(25);
        store.set_latency(Duration::from_millis(50));
        let engine = engine(&store, EngineOptions::default());

        let first = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.load_next_page().await })
        };
        // Let the first load reach its in-flight suspension point.
        tokio::task::yield_now().await;

        // Re-entrant call while loading: returns immediately, fetches nothing.
        engine.load_next_page().await.unwrap();

        first.await.unwrap().unwrap();
        assert_eq!(store.pages_fetched(), 1);
        assert_eq!(store.favorite_fetches(), 1);
        assert_eq!(engine.state().await.items.len(), 10);
    }

    #[tokio::test]
    async fn test_favorite_set_fetched_once_across_pages() {
        let store = seeded_store(25);
        let engine = engine(&store, EngineOptions::default());

        engine.load_next_page().await.unwrap();
        engine.load_next_page().await.unwrap();

        // Cached set reused; only the pages went to the network again.
        assert_eq!(store.favorite_fetches(), 1);
        assert_eq!(store.pages_fetched(), 2);
    }

    // =========================================================================
    // Failure & Snapshot Hydration
    // =========================================================================

    #[tokio::test]
    async fn test_failed_cold_start_adopts_snapshot_and_keeps_error() {
        let cache = temp_cache();
        cache
            .save(&[
                Product::from_record(record("c1", "Cached Kettle"), true),
                Product::from_record(record("c2", "Cached Mug"), false),
            ])
            .await;

        let store = seeded_store(5);
        store.fail_next_page_fetch();
        let engine = engine(
            &store,
            EngineOptions {
                cache: Some(cache),
                ..Default::default()
            },
        );

        let err = engine.load_next_page().await.unwrap_err();
        assert!(matches!(err, ErrorKind::Network(_)));

        let state = engine.state().await;
        assert_eq!(item_ids(&state), vec!["c1", "c2"]);
        assert!(state.error.is_some());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_retry_after_hydration_replaces_snapshot_items() {
        let cache = temp_cache();
        cache
            .save(&[Product::from_record(record("c1", "Cached Kettle"), false)])
            .await;

        let store = seeded_store(3);
        store.fail_next_page_fetch();
        let engine = engine(
            &store,
            EngineOptions {
                cache: Some(cache),
                ..Default::default()
            },
        );

        engine.load_next_page().await.unwrap_err();
        assert_eq!(item_ids(&engine.state().await), vec!["c1"]);

        // Retry succeeds: fetched page one replaces the provisional items.
        engine.load_next_page().await.unwrap();
        let state = engine.state().await;
        assert_eq!(state.items.len(), 3);
        assert!(!item_ids(&state).contains(&"c1"));
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_failure_with_loaded_items_keeps_them() {
        let store = seeded_store(25);
        let engine = engine(&store, EngineOptions::default());

        engine.load_next_page().await.unwrap();
        store.fail_next_page_fetch();
        engine.load_next_page().await.unwrap_err();

        let state = engine.state().await;
        assert_eq!(state.items.len(), 10);
        assert!(state.error.is_some());

        // The error clears on the next attempt and paging resumes.
        engine.load_next_page().await.unwrap();
        let state = engine.state().await;
        assert_eq!(state.items.len(), 20);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_cold_start_restore_then_fetch_does_not_duplicate() {
        let cache = temp_cache();
        cache
            .save(&[Product::from_record(record("p01", "Item 01"), false)])
            .await;

        let store = seeded_store(3);
        let engine = engine(
            &store,
            EngineOptions {
                cache: Some(cache),
                ..Default::default()
            },
        );

        engine.restore_snapshot().await;
        assert_eq!(item_ids(&engine.state().await), vec!["p01"]);

        engine.load_next_page().await.unwrap();
        let state = engine.state().await;
        // p01 appears once: the fetched page replaced the restored items.
        assert_eq!(item_ids(&state), vec!["p01", "p02", "p03"]);
    }

    #[tokio::test]
    async fn test_snapshot_written_after_every_merge() {
        let cache = temp_cache();
        let store = seeded_store(25);
        let engine = engine(
            &store,
            EngineOptions {
                cache: Some(cache.clone()),
                ..Default::default()
            },
        );

        engine.load_next_page().await.unwrap();
        assert_eq!(cache.load().await.unwrap().len(), 10);

        engine.load_next_page().await.unwrap();
        assert_eq!(cache.load().await.unwrap().len(), 20);
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    #[tokio::test]
    async fn test_load_fails_fast_without_user() {
        let store = seeded_store(5);
        let engine = engine(
            &store,
            EngineOptions {
                session: StaticSession::signed_out(),
                ..Default::default()
            },
        );

        let err = engine.load_next_page().await.unwrap_err();
        assert_eq!(err, ErrorKind::Unauthenticated);

        let state = engine.state().await;
        assert_eq!(state.error, Some(ErrorKind::Unauthenticated));
        assert!(!state.is_loading);
        assert_eq!(store.pages_fetched(), 0);
        assert_eq!(store.favorite_fetches(), 0);
    }

    #[tokio::test]
    async fn test_toggle_fails_fast_without_user() {
        let store = seeded_store(5);
        let engine = engine(
            &store,
            EngineOptions {
                session: StaticSession::signed_out(),
                ..Default::default()
            },
        );

        let err = engine.toggle_favorite("p01").await.unwrap_err();
        assert_eq!(err, ErrorKind::Unauthenticated);
        assert_eq!(engine.state().await.error, Some(ErrorKind::Unauthenticated));
    }

    // =========================================================================
    // Favorite Toggling
    // =========================================================================

    #[tokio::test]
    async fn test_toggle_commits_and_invalidates_favorite_set() {
        let store = seeded_store(25);
        let engine = engine(&store, EngineOptions::default());

        engine.load_next_page().await.unwrap();
        assert_eq!(store.favorite_fetches(), 1);

        engine.toggle_favorite("p01").await.unwrap();
        assert!(engine.state().await.product("p01").unwrap().favorite);
        assert!(store.is_favorite(USER, "p01"));

        // Invalidated set is refetched on the next page load.
        engine.load_next_page().await.unwrap();
        assert_eq!(store.favorite_fetches(), 2);
    }

    #[tokio::test]
    async fn test_toggle_off_deletes_the_favorite_document() {
        let store = seeded_store(5);
        store.mark_favorite(USER, "p02");
        let engine = engine(&store, EngineOptions::default());

        engine.load_next_page().await.unwrap();
        assert!(engine.state().await.product("p02").unwrap().favorite);

        engine.toggle_favorite("p02").await.unwrap();
        assert!(!engine.state().await.product("p02").unwrap().favorite);
        assert!(!store.is_favorite(USER, "p02"));
    }

    #[tokio::test]
    async fn test_failed_toggle_rolls_back_the_flip() {
        let store = seeded_store(5);
        let engine = engine(&store, EngineOptions::default());
        engine.load_next_page().await.unwrap();

        store.fail_next_mutation();
        let err = engine.toggle_favorite("p01").await.unwrap_err();
        assert!(matches!(err, ErrorKind::Network(_)));

        let state = engine.state().await;
        assert!(!state.product("p01").unwrap().favorite);
        assert!(state.error.is_some());
        assert!(!store.is_favorite(USER, "p01"));
    }

    #[tokio::test]
    async fn test_toggle_unknown_product_is_a_no_op() {
        let store = seeded_store(5);
        let engine = engine(&store, EngineOptions::default());
        engine.load_next_page().await.unwrap();

        let err = engine.toggle_favorite("ghost").await.unwrap_err();
        assert_eq!(err, ErrorKind::NotFound("ghost".to_string()));

        // Published state untouched: a vanished product is not a view error.
        let state = engine.state().await;
        assert!(state.error.is_none());
        assert_eq!(state.items.len(), 5);
    }

    // =========================================================================
    // Favorites-Only View
    // =========================================================================

    #[tokio::test]
    async fn test_unfavorite_in_favorites_view_reloads_from_page_one() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_record(record("a", "Apple"));
        store.insert_record(record("b", "Banana"));
        store.insert_record(record("c", "Cherry"));
        store.insert_record(record("d", "Date"));
        for id in ["a", "b", "c"] {
            store.mark_favorite(USER, id);
        }

        let engine = engine(
            &store,
            EngineOptions {
                page_size: 2,
                only_favorite: true,
                ..Default::default()
            },
        );

        engine.load_next_page().await.unwrap();
        assert_eq!(item_ids(&engine.state().await), vec!["a", "b"]);

        // Un-favoriting Apple reloads; Cherry re-flows in from a later page.
        engine.toggle_favorite("a").await.unwrap();
        while !engine.state().await.is_end_reached {
            engine.load_next_page().await.unwrap();
        }

        let state = engine.state().await;
        assert_eq!(item_ids(&state), vec!["b", "c"]);
        assert!(!store.is_favorite(USER, "a"));
    }

    #[tokio::test]
    async fn test_end_detection_uses_raw_page_length() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_record(record("a", "Apple"));
        store.insert_record(record("b", "Banana"));
        store.insert_record(record("c", "Cherry"));
        store.mark_favorite(USER, "a");

        let engine = engine(
            &store,
            EngineOptions {
                page_size: 3,
                only_favorite: true,
                ..Default::default()
            },
        );

        // One favorite survives the filter, but the raw page was full, so
        // the catalog is not treated as exhausted.
        engine.load_next_page().await.unwrap();
        let state = engine.state().await;
        assert_eq!(item_ids(&state), vec!["a"]);
        assert!(!state.is_end_reached);

        engine.load_next_page().await.unwrap();
        assert!(engine.state().await.is_end_reached);
    }

    // =========================================================================
    // Search
    // =========================================================================

    #[tokio::test]
    async fn test_search_filters_without_touching_state_or_network() {
        let store = seeded_store(12);
        let engine = engine(&store, EngineOptions::default());
        engine.load_next_page().await.unwrap();

        let before = engine.state().await;
        let pages_before = store.pages_fetched();

        let hits = engine.search("item 0").await;
        assert_eq!(hits.len(), 9);
        let all = engine.search("").await;
        assert_eq!(all.len(), before.items.len());
        let none = engine.search("toaster").await;
        assert!(none.is_empty());

        let after = engine.state().await;
        assert_eq!(item_ids(&before), item_ids(&after));
        assert_eq!(before.is_end_reached, after.is_end_reached);
        assert_eq!(store.pages_fetched(), pages_before);
    }

    // =========================================================================
    // Timeout & Cancellation
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_slow_remote_surfaces_timeout() {
        let store = seeded_store(5);
        store.set_latency(Duration::from_secs(60));
        let engine = engine(&store, EngineOptions::default());

        let err = engine.load_next_page().await.unwrap_err();
        assert_eq!(err, ErrorKind::Timeout(30));
        assert_eq!(engine.state().await.error, Some(ErrorKind::Timeout(30)));
        assert_eq!(store.pages_fetched(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_mid_fetch_saves_snapshot_but_publishes_nothing() {
        let cache = temp_cache();
        let store = seeded_store(5);
        store.set_latency(Duration::from_millis(50));
        let engine = engine(
            &store,
            EngineOptions {
                cache: Some(cache.clone()),
                ..Default::default()
            },
        );

        let load = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.load_next_page().await })
        };
        tokio::task::yield_now().await;
        engine.shutdown();

        load.await.unwrap().unwrap();

        // Fetch-to-cache completed, published state did not move.
        assert_eq!(cache.load().await.unwrap().len(), 5);
        let state = engine.state().await;
        assert!(state.items.is_empty());
        assert!(!state.is_loading);
    }

    // =========================================================================
    // Event Emission
    // =========================================================================

    struct RecordingEmitter {
        events: StdMutex<Vec<CatalogViewState>>,
    }

    impl CatalogEventEmitter for RecordingEmitter {
        fn state_changed(&self, state: &CatalogViewState) {
            self.events.lock().unwrap().push(state.clone());
        }
    }

    #[tokio::test]
    async fn test_observers_see_loading_flip_and_merge() {
        let emitter = Arc::new(RecordingEmitter {
            events: StdMutex::new(Vec::new()),
        });
        let store = seeded_store(5);
        let engine = engine(
            &store,
            EngineOptions {
                emitter: Some(emitter.clone()),
                ..Default::default()
            },
        );

        engine.load_next_page().await.unwrap();

        let events = emitter.events.lock().unwrap();
        assert!(events.len() >= 2);
        assert!(events.first().unwrap().is_loading);
        let last = events.last().unwrap();
        assert!(!last.is_loading);
        assert_eq!(last.items.len(), 5);
    }

    // =========================================================================
    // Builder
    // =========================================================================

    #[tokio::test]
    async fn test_builder_requires_collaborators() {
        let result = CatalogEngine::builder(config(10)).build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_builder_rejects_invalid_config() {
        let store = seeded_store(1);
        let result = CatalogEngine::builder(config(0))
            .with_remote(store.clone())
            .with_favorites(store.clone())
            .with_session(Arc::new(StaticSession::signed_in(USER)))
            .build();
        assert!(result.is_err());
    }
}
