//! # vitrina-core: Pure Domain Logic for Vitrina
//!
//! This crate is the **heart** of the Vitrina catalog. It contains the domain
//! types and pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vitrina Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI Screens (external glue)                   │   │
//! │  │    Catalog list ──► Favorites ──► Detail ──► Reviews           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CatalogViewState (read)                │
//! │                                │ load/toggle/reload/search (invoke)     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                vitrina-sync (Catalog Sync Engine)               │   │
//! │  │       paging, favorite overlay, optimistic mutations            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vitrina-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   state   │  │  search   │  │ validation│  │   │
//! │  │   │  Product  │  │  Catalog  │  │  filter   │  │   rules   │  │   │
//! │  │   │  Cursor   │  │ ViewState │  │  by name  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO REMOTE STORE • NO NETWORK • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, PageCursor, Review, etc.)
//! - [`state`] - The published [`CatalogViewState`] object
//! - [`error`] - Domain error types
//! - [`search`] - Pure client-side search filter
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Remote store, network, file system access is FORBIDDEN here
//! 3. **Derived Overlay**: `favorite` is computed from set membership, never stored
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod search;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vitrina_core::Product` instead of
// `use vitrina_core::types::Product`

pub use error::{CoreResult, ErrorKind, ValidationError};
pub use state::CatalogViewState;
pub use types::{CatalogPage, PageCursor, Product, ProductRecord, Review};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default number of products requested per catalog page.
///
/// The remote contract treats page size as a tunable, not a constant; this
/// is only the fallback used when configuration does not override it.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on a configured page size.
///
/// Keeps a misconfigured client from requesting the whole catalog in one
/// round trip.
pub const MAX_PAGE_SIZE: usize = 100;

/// Review rating bounds (inclusive).
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Maximum review comment length in characters.
pub const MAX_COMMENT_LEN: usize = 2000;
