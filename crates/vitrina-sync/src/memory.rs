//! # In-Memory Backend
//!
//! A full in-process implementation of every source contract, used by tests
//! and demos. It mirrors the remote store's observable behavior closely
//! enough that the engine cannot tell the difference:
//!
//! - catalog documents live in a `BTreeMap` keyed by `(name, id)`, so cursor
//!   pagination is a range scan over the same total order the real store
//!   queries by
//! - documents are raw JSON values decoded per fetch, so the
//!   drop-one-malformed-record path is exercised for real
//! - favorite documents are keyed presence, body denormalized, no boolean
//! - ids are minted on insert
//!
//! Failure and latency injection knobs let tests script the exact remote
//! misbehavior a scenario needs.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use vitrina_core::{CatalogPage, CoreResult, ErrorKind, PageCursor, ProductRecord, Review};

use crate::source::{FavoriteSetSource, NewReview, RemoteCatalogSource, ReviewSource};

// =============================================================================
// Store Data
// =============================================================================

#[derive(Default)]
struct StoreInner {
    /// Raw catalog documents in `(name, id)` order.
    products: BTreeMap<(String, String), serde_json::Value>,

    /// user id → product id → denormalized record body.
    favorites: HashMap<String, HashMap<String, ProductRecord>>,

    /// product id → reviews in insertion order (oldest first).
    reviews: HashMap<String, Vec<Review>>,

    /// user id → display name.
    user_names: HashMap<String, String>,
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// In-process implementation of the catalog, favorite, and review sources.
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,

    // Call counters, for single-flight and invalidation assertions.
    pages_fetched: AtomicUsize,
    favorite_fetches: AtomicUsize,

    // Pending injected failures, consumed one per matching call.
    page_fetch_failures: AtomicUsize,
    favorite_fetch_failures: AtomicUsize,
    mutation_failures: AtomicUsize,

    /// Artificial latency applied at the start of every remote call.
    latency: Mutex<Option<Duration>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            inner: Mutex::new(StoreInner::default()),
            pages_fetched: AtomicUsize::new(0),
            favorite_fetches: AtomicUsize::new(0),
            page_fetch_failures: AtomicUsize::new(0),
            favorite_fetch_failures: AtomicUsize::new(0),
            mutation_failures: AtomicUsize::new(0),
            latency: Mutex::new(None),
        }
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Inserts a catalog product, minting its id the way the remote store
    /// does on document creation.
    pub fn insert_product(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        images: Vec<String>,
    ) -> String {
        let record = ProductRecord {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            images,
        };
        let id = record.id.clone();
        self.insert_record(record);
        id
    }

    /// Inserts a catalog product with a caller-chosen id.
    pub fn insert_record(&self, record: ProductRecord) {
        match serde_json::to_value(&record) {
            Ok(document) => {
                let mut inner = self.inner.lock().unwrap();
                inner
                    .products
                    .insert((record.name.clone(), record.id.clone()), document);
            }
            Err(e) => warn!(id = %record.id, error = %e, "Could not encode product record"),
        }
    }

    /// Inserts a raw document under the given sort key. Lets tests plant
    /// malformed records that fail to decode at fetch time.
    pub fn insert_raw(&self, name: impl Into<String>, id: impl Into<String>, document: serde_json::Value) {
        let mut inner = self.inner.lock().unwrap();
        inner.products.insert((name.into(), id.into()), document);
    }

    /// Seeds a favorite document directly, body copied from the catalog.
    pub fn mark_favorite(&self, user_id: &str, product_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .products
            .values()
            .find_map(|v| serde_json::from_value::<ProductRecord>(v.clone()).ok().filter(|r| r.id == product_id));
        if let Some(record) = record {
            inner
                .favorites
                .entry(user_id.to_string())
                .or_default()
                .insert(product_id.to_string(), record);
        }
    }

    /// Sets a user's display name.
    pub fn set_user_name(&self, user_id: impl Into<String>, name: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.user_names.insert(user_id.into(), name.into());
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Number of catalog pages served so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched.load(Ordering::SeqCst)
    }

    /// Number of favorite-set fetches served so far.
    pub fn favorite_fetches(&self) -> usize {
        self.favorite_fetches.load(Ordering::SeqCst)
    }

    /// Whether a favorite document exists for the pair.
    pub fn is_favorite(&self, user_id: &str, product_id: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .favorites
            .get(user_id)
            .is_some_and(|m| m.contains_key(product_id))
    }

    // =========================================================================
    // Failure & Latency Injection
    // =========================================================================

    /// Makes the next catalog page fetch fail with a network error.
    pub fn fail_next_page_fetch(&self) {
        self.page_fetch_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Makes the next favorite-set fetch fail with a network error.
    pub fn fail_next_favorite_fetch(&self) {
        self.favorite_fetch_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Makes the next favorite mutation fail with a network error.
    pub fn fail_next_mutation(&self) {
        self.mutation_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Applies an artificial delay to every subsequent remote call.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn take_failure(&self, counter: &AtomicUsize, what: &str) -> CoreResult<()> {
        let mut pending = counter.load(Ordering::SeqCst);
        while pending > 0 {
            match counter.compare_exchange(pending, pending - 1, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return Err(ErrorKind::Network(format!("injected {what} failure"))),
                Err(actual) => pending = actual,
            }
        }
        Ok(())
    }
}

// =============================================================================
// RemoteCatalogSource
// =============================================================================

#[async_trait]
impl RemoteCatalogSource for InMemoryStore {
    async fn fetch_page(
        &self,
        cursor: Option<PageCursor>,
        page_size: usize,
    ) -> CoreResult<CatalogPage> {
        self.simulate_latency().await;
        self.take_failure(&self.page_fetch_failures, "catalog fetch")?;
        self.pages_fetched.fetch_add(1, Ordering::SeqCst);

        let inner = self.inner.lock().unwrap();
        let lower = match cursor {
            Some(c) => {
                let (name, id) = c.position();
                Bound::Excluded((name.to_string(), id.to_string()))
            }
            None => Bound::Unbounded,
        };
        let range = inner.products.range((lower, Bound::Unbounded));

        let mut records = Vec::new();
        let mut raw_len = 0;
        let mut last_key = None;
        for ((name, id), document) in range.take(page_size) {
            raw_len += 1;
            last_key = Some((name.clone(), id.clone()));
            match serde_json::from_value::<ProductRecord>(document.clone()) {
                Ok(record) => records.push(record),
                Err(e) => warn!(id = %id, error = %e, "Dropping malformed product record"),
            }
        }

        let next_cursor = last_key.map(|(name, id)| PageCursor::after(name, id));
        Ok(CatalogPage {
            records,
            next_cursor,
            raw_len,
        })
    }
}

// =============================================================================
// FavoriteSetSource
// =============================================================================

#[async_trait]
impl FavoriteSetSource for InMemoryStore {
    async fn fetch_favorite_ids(&self, user_id: &str) -> CoreResult<HashSet<String>> {
        self.simulate_latency().await;
        self.take_failure(&self.favorite_fetch_failures, "favorite fetch")?;
        self.favorite_fetches.fetch_add(1, Ordering::SeqCst);

        let inner = self.inner.lock().unwrap();
        Ok(inner
            .favorites
            .get(user_id)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn add_favorite(&self, user_id: &str, record: &ProductRecord) -> CoreResult<()> {
        self.simulate_latency().await;
        self.take_failure(&self.mutation_failures, "favorite add")?;

        let mut inner = self.inner.lock().unwrap();
        inner
            .favorites
            .entry(user_id.to_string())
            .or_default()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn remove_favorite(&self, user_id: &str, product_id: &str) -> CoreResult<()> {
        self.simulate_latency().await;
        self.take_failure(&self.mutation_failures, "favorite remove")?;

        let mut inner = self.inner.lock().unwrap();
        if let Some(per_user) = inner.favorites.get_mut(user_id) {
            per_user.remove(product_id);
        }
        Ok(())
    }
}

// =============================================================================
// ReviewSource
// =============================================================================

#[async_trait]
impl ReviewSource for InMemoryStore {
    async fn fetch_reviews(&self, product_id: &str) -> CoreResult<Vec<Review>> {
        self.simulate_latency().await;
        self.take_failure(&self.page_fetch_failures, "review fetch")?;

        let inner = self.inner.lock().unwrap();
        let mut reviews: Vec<Review> = inner
            .reviews
            .get(product_id)
            .map(|r| r.iter().rev().cloned().collect())
            .unwrap_or_default();
        // Stable sort over the reversed list keeps same-timestamp reviews
        // newest-inserted first.
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn add_review(&self, product_id: &str, review: NewReview) -> CoreResult<()> {
        self.simulate_latency().await;
        self.take_failure(&self.mutation_failures, "review add")?;

        let review = Review {
            id: Uuid::new_v4().to_string(),
            user_id: review.user_id,
            user_name: review.user_name,
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner
            .reviews
            .entry(product_id.to_string())
            .or_default()
            .push(review);
        Ok(())
    }

    async fn fetch_user_name(&self, user_id: &str) -> CoreResult<Option<String>> {
        self.simulate_latency().await;
        let inner = self.inner.lock().unwrap();
        Ok(inner.user_names.get(user_id).cloned())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
