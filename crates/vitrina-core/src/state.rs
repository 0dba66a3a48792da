//! # Catalog View State
//!
//! The single published state object observers consume.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Engine State Transitions                           │
//! │                                                                         │
//! │              load_next_page()           merge ok                        │
//! │   ┌──────┐ ───────────────────► ┌─────────┐ ──────────► ┌──────┐       │
//! │   │ Idle │                      │ Loading │             │ Idle │       │
//! │   └──────┘ ◄─────────────────── └─────────┘ ──────────► └──────┘       │
//! │      ▲       no-op (guard:           │        fetch failed: error set, │
//! │      │       loading / end reached)  │        hydrate cache if empty   │
//! │      └───────────────────────────────┘                                 │
//! │                                                                         │
//! │   is_loading    ⇔ Loading                                              │
//! │   error.is_some ⇔ last operation failed (cleared on next load)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invariants:
//! - `is_loading` is true for at most the duration of one in-flight fetch
//! - `is_end_reached` becomes true only when a page returns fewer raw items
//!   than the requested page size, and is only unset by a full reload
//! - `items` never contains two entries with the same id

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::types::Product;

/// Published catalog state. Cloned out to observers on every change;
/// observers hold read copies only and call back into the engine to mutate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogViewState {
    /// Loaded products in stable `(name, id)` order, favorite overlay
    /// applied.
    pub items: Vec<Product>,

    /// True while exactly one page fetch is in flight.
    pub is_loading: bool,

    /// True once a page came back shorter than the configured page size.
    pub is_end_reached: bool,

    /// Failure of the most recent operation, if any.
    pub error: Option<ErrorKind>,
}

impl CatalogViewState {
    /// Looks up a loaded product by id.
    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.items.iter().find(|p| p.id == product_id)
    }

    /// True when nothing has been loaded or restored yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
