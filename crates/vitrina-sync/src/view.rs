//! # Search View
//!
//! A read-only, filtered view over one engine's published items.
//!
//! The view owns nothing but a query string: every call to [`results`]
//! recomputes the subsequence from the engine's current state, so a page
//! merge or a favorite toggle is visible on the next read without any
//! subscription plumbing. Searching never issues I/O and never moves
//! pagination.
//!
//! [`results`]: SearchView::results

use std::sync::{Arc, RwLock};

use vitrina_core::Product;

use crate::engine::CatalogEngine;

/// Filtered, read-only projection of a [`CatalogEngine`]'s items.
pub struct SearchView {
    engine: Arc<CatalogEngine>,
    query: RwLock<String>,
}

impl SearchView {
    /// Creates a view over the given engine with an empty query.
    pub fn new(engine: Arc<CatalogEngine>) -> Self {
        SearchView {
            engine,
            query: RwLock::new(String::new()),
        }
    }

    /// Sets the active query.
    pub fn set_query(&self, query: impl Into<String>) {
        *self.query.write().expect("query lock poisoned") = query.into();
    }

    /// The active query.
    pub fn query(&self) -> String {
        self.query.read().expect("query lock poisoned").clone()
    }

    /// The loaded items matching the active query, in original order. An
    /// empty query returns every loaded item.
    pub async fn results(&self) -> Vec<Product> {
        let query = self.query();
        self.engine.search(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::memory::InMemoryStore;
    use crate::source::StaticSession;
    use vitrina_core::ProductRecord;

    async fn loaded_view() -> (Arc<InMemoryStore>, SearchView) {
        let store = Arc::new(InMemoryStore::new());
        for (id, name) in [("p1", "Electric Kettle"), ("p2", "Mug"), ("p3", "Tea Kettle")] {
            store.insert_record(ProductRecord {
                id: id.into(),
                name: name.into(),
                description: String::new(),
                images: Vec::new(),
            });
        }

        let mut config = CatalogConfig::default();
        config.cache.enabled = false;
        let engine = Arc::new(
            CatalogEngine::builder(config)
                .with_remote(store.clone())
                .with_favorites(store.clone())
                .with_session(Arc::new(StaticSession::signed_in("user-1")))
                .build()
                .unwrap(),
        );
        engine.load_next_page().await.unwrap();

        (store, SearchView::new(engine))
    }

    #[tokio::test]
    async fn test_empty_query_shows_all_loaded_items() {
        let (_store, view) = loaded_view().await;
        assert_eq!(view.results().await.len(), 3);
    }

    #[tokio::test]
    async fn test_query_narrows_results_in_order() {
        let (_store, view) = loaded_view().await;
        view.set_query("kettle");

        let names: Vec<String> = view.results().await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Electric Kettle", "Tea Kettle"]);
    }

    #[tokio::test]
    async fn test_results_never_touch_the_network() {
        let (store, view) = loaded_view().await;
        let pages = store.pages_fetched();

        view.set_query("kettle");
        let _ = view.results().await;
        view.set_query("");
        let _ = view.results().await;

        assert_eq!(store.pages_fetched(), pages);
    }
}
