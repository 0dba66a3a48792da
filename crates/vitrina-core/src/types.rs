//! # Domain Types
//!
//! Core domain types used throughout Vitrina.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ProductRecord  │   │     Product     │   │     Review      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (remote)    │   │  ProductRecord  │   │  id (remote)    │       │
//! │  │  name           │ + │  favorite: bool │   │  rating 1..=5   │       │
//! │  │  description    │   │  (derived, see  │   │  comment        │       │
//! │  │  images         │   │   overlay)      │   │  created_at     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   PageCursor    │   │   CatalogPage   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  (name, id) of  │   │  records        │                             │
//! │  │  last item seen │   │  next_cursor    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Overlay Pattern
//! `favorite` is never stored on the remote product document. It is derived at
//! merge time by intersecting the product id with the user's favorite-id set.
//! `ProductRecord` is the wire shape; `Product` is the published shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Product Record (wire shape)
// =============================================================================

/// A catalog product as the remote store returns it.
///
/// Carries no `favorite` flag: presence in the user's favorite collection is
/// the only source of that state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Unique identifier, assigned by the remote store on creation. Immutable.
    pub id: String,

    /// Display name. Primary sort key for catalog pagination.
    pub name: String,

    /// Free-form description shown on the detail screen.
    pub description: String,

    /// Image URLs in display order.
    #[serde(default)]
    pub images: Vec<String>,
}

// =============================================================================
// Product (published shape)
// =============================================================================

/// A catalog product as published to observers, with the favorite overlay
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,

    /// Derived field: whether this product's id is in the current user's
    /// favorite set. Reflects the set as of the last merge or toggle.
    #[serde(default)]
    pub favorite: bool,
}

impl Product {
    /// Builds a published product from a wire record and its overlay flag.
    pub fn from_record(record: ProductRecord, favorite: bool) -> Self {
        Product {
            id: record.id,
            name: record.name,
            description: record.description,
            images: record.images,
            favorite,
        }
    }

    /// Returns the favorite-free wire shape of this product.
    ///
    /// Used when a favorite mutation denormalizes the product body into the
    /// user's favorite collection.
    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            images: self.images.clone(),
        }
    }
}

// =============================================================================
// Page Cursor
// =============================================================================

/// Opaque continuation token marking the last item of the most recently
/// fetched page.
///
/// Catalog pagination is ordered by name with id as the tie-break, which
/// gives a total order, so repeated fetches with the same cursor can
/// neither repeat nor skip items. Observers treat the token as opaque;
/// only source implementations look inside.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageCursor {
    last_name: String,
    last_id: String,
}

impl PageCursor {
    /// Creates a cursor positioned after the given item.
    pub fn after(name: impl Into<String>, id: impl Into<String>) -> Self {
        PageCursor {
            last_name: name.into(),
            last_id: id.into(),
        }
    }

    /// The `(name, id)` sort key this cursor points past.
    pub fn position(&self) -> (&str, &str) {
        (&self.last_name, &self.last_id)
    }
}

// =============================================================================
// Catalog Page
// =============================================================================

/// One fetched page of the remote catalog.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    /// Decoded records in `(name, id)` order.
    pub records: Vec<ProductRecord>,

    /// Cursor for the next page; `None` when the source had nothing after
    /// this page.
    pub next_cursor: Option<PageCursor>,

    /// Number of documents the remote returned for this page, counting any
    /// that failed to decode and were dropped. End-of-data detection compares
    /// this, never a client-side filtered length, against the requested
    /// page size.
    pub raw_len: usize,
}

impl CatalogPage {
    /// Builds a page whose raw length equals its decoded record count, the
    /// common case for sources that never drop records.
    pub fn new(records: Vec<ProductRecord>, next_cursor: Option<PageCursor>) -> Self {
        let raw_len = records.len();
        CatalogPage {
            records,
            next_cursor,
            raw_len,
        }
    }
}

// =============================================================================
// Review
// =============================================================================

/// A user review attached to one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier, assigned by the remote store on creation.
    pub id: String,

    /// Author's user id.
    pub user_id: String,

    /// Author's display name, resolved at submission time.
    pub user_name: String,

    /// Star rating, 1..=5.
    pub rating: u8,

    /// Free-form comment text.
    pub comment: String,

    /// Submission timestamp. Review lists are ordered newest-first.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
