//! # Source Contracts
//!
//! The engine's boundary seams. Every remote collaborator is an object-safe
//! async trait so UI glue can inject a real backend and tests can inject the
//! in-memory one; the engine itself never knows a wire format.
//!
//! ## Boundary Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Engine Boundary Seams                              │
//! │                                                                         │
//! │  ┌──────────────────────┐   ordered-by-(name,id) cursor pages          │
//! │  │ RemoteCatalogSource  │   page size is configuration                 │
//! │  └──────────────────────┘                                              │
//! │                                                                         │
//! │  ┌──────────────────────┐   per-user sub-collection keyed by product   │
//! │  │ FavoriteSetSource    │   id; document PRESENCE is the flag, no      │
//! │  └──────────────────────┘   stored boolean                             │
//! │                                                                         │
//! │  ┌──────────────────────┐   per-product review sub-collection,         │
//! │  │ ReviewSource         │   listed newest-first                        │
//! │  └──────────────────────┘                                              │
//! │                                                                         │
//! │  ┌──────────────────────┐   upstream input from the excluded auth      │
//! │  │ UserSession          │   glue: Option<current user id>              │
//! │  └──────────────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each favorite mutation is a single remote write; there is no multi-document
//! transaction. Any consistency beyond one write is the engine's job.

use std::collections::HashSet;

use async_trait::async_trait;

use vitrina_core::{CatalogPage, CoreResult, PageCursor, ProductRecord, Review};

// =============================================================================
// Remote Catalog
// =============================================================================

/// Paginated, read-only view of the remote product catalog.
#[async_trait]
pub trait RemoteCatalogSource: Send + Sync {
    /// Fetches the page after `cursor` (or the first page when `None`).
    ///
    /// ## Contract
    /// - Records come back in stable `(name, id)` total order, so repeated
    ///   calls with the same cursor are idempotent and pages can neither
    ///   repeat nor skip items
    /// - An individually malformed record is dropped (with a warning) and
    ///   the rest of the page survives; an unreadable page envelope fails
    ///   the whole call with [`ErrorKind::Decoding`]
    /// - Transport failures surface as [`ErrorKind::Network`]
    ///
    /// [`ErrorKind::Decoding`]: vitrina_core::ErrorKind::Decoding
    /// [`ErrorKind::Network`]: vitrina_core::ErrorKind::Network
    async fn fetch_page(
        &self,
        cursor: Option<PageCursor>,
        page_size: usize,
    ) -> CoreResult<CatalogPage>;
}

// =============================================================================
// Favorite Set
// =============================================================================

/// The per-user favorite collection.
///
/// Existence of a document under `users/{user}/favorites/{product}` is the
/// favorite flag; there is no stored boolean.
#[async_trait]
pub trait FavoriteSetSource: Send + Sync {
    /// Fetches the full set of favorite product ids for one user.
    async fn fetch_favorite_ids(&self, user_id: &str) -> CoreResult<HashSet<String>>;

    /// Marks a product favorite by creating its document. The record body is
    /// denormalized into the document so the favorites screen can render
    /// without a catalog join.
    async fn add_favorite(&self, user_id: &str, record: &ProductRecord) -> CoreResult<()>;

    /// Unmarks a product favorite by deleting its document.
    async fn remove_favorite(&self, user_id: &str, product_id: &str) -> CoreResult<()>;
}

// =============================================================================
// Reviews
// =============================================================================

/// A review as submitted, before the remote store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub user_id: String,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
}

/// The per-product review collection.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetches all reviews for one product, newest first.
    async fn fetch_reviews(&self, product_id: &str) -> CoreResult<Vec<Review>>;

    /// Appends a review to one product's collection.
    async fn add_review(&self, product_id: &str, review: NewReview) -> CoreResult<()>;

    /// Resolves a user's display name, `None` when the profile has none.
    async fn fetch_user_name(&self, user_id: &str) -> CoreResult<Option<String>>;
}

// =============================================================================
// User Session
// =============================================================================

/// Upstream input from the excluded auth glue: who, if anyone, is signed in.
///
/// The engine queries this at the start of every catalog/favorite operation
/// and fails fast with [`ErrorKind::Unauthenticated`] when it returns `None`.
///
/// [`ErrorKind::Unauthenticated`]: vitrina_core::ErrorKind::Unauthenticated
pub trait UserSession: Send + Sync {
    /// The current user id, if a user is signed in.
    fn current_user_id(&self) -> Option<String>;
}

/// Fixed session for tests and single-user tools.
#[derive(Debug, Clone)]
pub struct StaticSession {
    user_id: Option<String>,
}

impl StaticSession {
    /// A session with a signed-in user.
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        StaticSession {
            user_id: Some(user_id.into()),
        }
    }

    /// A session with nobody signed in.
    pub fn signed_out() -> Self {
        StaticSession { user_id: None }
    }
}

impl UserSession for StaticSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_session() {
        assert_eq!(
            StaticSession::signed_in("user-1").current_user_id(),
            Some("user-1".to_string())
        );
        assert_eq!(StaticSession::signed_out().current_user_id(), None);
    }
}
