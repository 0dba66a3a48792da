//! # vitrina-sync: Catalog Sync Engine for Vitrina
//!
//! This crate reconciles three independent, partially-overlapping data
//! sources (the paginated remote catalog, the per-user favorite-id
//! collection, and the on-disk snapshot) under concurrent, fallible,
//! asynchronous I/O, with no server-side transactions tying them together.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Catalog Engine Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  CatalogEngine (Main Orchestrator)               │  │
//! │  │                                                                  │  │
//! │  │  One shared instance behind an Arc; every screen observes the    │  │
//! │  │  same published CatalogViewState                                 │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ RemoteCatalog- │  │ FavoriteSet-   │  │  SnapshotCache         │    │
//! │  │ Source         │  │ Source         │  │  (vitrina-cache)       │    │
//! │  │                │  │                │  │                        │    │
//! │  │ (name,id)      │  │ Presence-keyed │  │ Written after every    │    │
//! │  │ cursor pages   │  │ per-user ids   │  │ merge, read only while │    │
//! │  │                │  │                │  │ items is empty         │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  GUARANTEES:                                                           │
//! │  ────────────                                                          │
//! │  • Single-flight: overlapping load_next_page calls fetch once          │
//! │  • No duplicate ids: cursor monotonicity, not a post-filter            │
//! │  • Optimistic toggles roll back on remote failure                      │
//! │  • Failures land in CatalogViewState.error, never panic the UI        │
//! │                                                                         │
//! │  SIDE VIEWS:                                                           │
//! │  ───────────                                                           │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  SearchView    │  │  ReviewFeed    │                                │
//! │  │                │  │                │                                │
//! │  │ Pure filter    │  │ Per-product    │                                │
//! │  │ over loaded    │  │ reviews,       │                                │
//! │  │ items          │  │ newest first   │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - Main `CatalogEngine` orchestrator and event emitter
//! - [`config`] - Catalog configuration (page size, timeouts, cache path)
//! - [`error`] - Error types and the `SyncResult` alias
//! - [`source`] - Source trait seams and the user session input
//! - [`memory`] - In-process backend for tests and demos
//! - [`view`] - Read-only search view over an engine
//! - [`reviews`] - Per-product review feed
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vitrina_sync::{CatalogConfig, CatalogEngine, StaticSession};
//!
//! let config = CatalogConfig::load_or_default(None);
//! let engine = Arc::new(
//!     CatalogEngine::builder(config)
//!         .with_remote(remote)
//!         .with_favorites(favorites)
//!         .with_session(Arc::new(StaticSession::signed_in(user_id)))
//!         .build()?,
//! );
//!
//! engine.restore_snapshot().await;      // cold start: render cached items
//! engine.load_next_page().await?;       // fetch + overlay + persist
//! engine.toggle_favorite("p1").await?;  // optimistic, rolls back on failure
//! let hits = engine.search("kettle").await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod reviews;
pub mod source;
pub mod view;

// =============================================================================
// Re-exports
// =============================================================================

// Core engine types
pub use engine::{CatalogEngine, CatalogEngineBuilder, CatalogEventEmitter, NoOpEmitter};

// Configuration
pub use config::{CacheSettings, CatalogConfig, CatalogSettings};

// Errors
pub use error::{ConfigError, ErrorKind, SyncResult};

// Source seams
pub use source::{
    FavoriteSetSource, NewReview, RemoteCatalogSource, ReviewSource, StaticSession, UserSession,
};

// Side views
pub use reviews::{ReviewFeed, ReviewFeedState};
pub use view::SearchView;

// Test/demo backend
pub use memory::InMemoryStore;

// Re-exported domain types observers need
pub use vitrina_core::{CatalogViewState, PageCursor, Product, ProductRecord, Review};
