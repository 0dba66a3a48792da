//! # vitrina-cache: Local Snapshot Layer for Vitrina
//!
//! This crate persists the last known-good product list so the catalog can
//! come up after a failed fetch or a cold start without connectivity.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vitrina Data Flow                                │
//! │                                                                         │
//! │  CatalogEngine (vitrina-sync)                                          │
//! │       │ save after every merge      │ load on cold start / fetch fail  │
//! │       ▼                             ▼                                   │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   vitrina-cache (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐         ┌──────────────────────────────┐  │   │
//! │  │   │ SnapshotCache  │         │ LocalSnapshot                │  │   │
//! │  │   │ (snapshot.rs)  │────────►│ { items, saved_at }          │  │   │
//! │  │   │ save/load/clear│         │ one serde_json blob          │  │   │
//! │  │   └────────────────┘         └──────────────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   <data dir>/vitrina/catalog_snapshot.json                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`snapshot`] - The snapshot store and on-disk format
//! - [`error`] - Cache error types (never cross the save/load boundary)

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CacheError, CacheResult};
pub use snapshot::{LocalSnapshot, SnapshotCache};
