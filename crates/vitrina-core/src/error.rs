//! # Error Types
//!
//! Domain-specific error types for vitrina-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vitrina-core errors (this file)                                       │
//! │  ├── ErrorKind        - Published operation failures                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vitrina-cache errors (separate crate)                                 │
//! │  └── CacheError       - Snapshot I/O failures (logged, never surfaced) │
//! │                                                                         │
//! │  Flow: source failure → ErrorKind → CatalogViewState.error → observer  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. `ErrorKind` is `Clone` so it can live inside the published view state
//! 3. A missing snapshot is NOT an error; the cache load path returns
//!    `Option`, never `ErrorKind`
//! 4. Collaborator failures are captured into the view state, never raised
//!    as uncaught failures to the UI layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Operation failures as published in [`CatalogViewState`].
///
/// [`CatalogViewState`]: crate::state::CatalogViewState
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ErrorKind {
    /// A remote call failed. Transient: the caller may retry the operation.
    #[error("network error: {0}")]
    Network(String),

    /// A remote payload could not be decoded.
    #[error("malformed record: {0}")]
    Decoding(String),

    /// The mutated product is no longer present in the loaded items.
    #[error("product not found: {0}")]
    NotFound(String),

    /// No current user id is available. Catalog and favorite operations
    /// require one and fail fast instead of proceeding with an undefined id.
    #[error("no authenticated user")]
    Unauthenticated,

    /// A remote call did not complete within the configured deadline.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Input validation failed before any I/O was attempted.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl ErrorKind {
    /// Returns true if retrying the same operation can reasonably succeed.
    ///
    /// ## Retryable
    /// - Network failures
    /// - Timeouts
    ///
    /// ## Non-Retryable
    /// - Decode failures (the payload will not change)
    /// - Missing products, missing user, invalid input
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Network(_) | ErrorKind::Timeout(_))
    }
}

impl From<serde_json::Error> for ErrorKind {
    fn from(err: serde_json::Error) -> Self {
        ErrorKind::Decoding(err.to_string())
    }
}

impl From<ValidationError> for ErrorKind {
    fn from(err: ValidationError) -> Self {
        ErrorKind::Validation(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before any remote call runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ErrorKind.
pub type CoreResult<T> = Result<T, ErrorKind>;

// =============================================================================
// Unit Tests
// =============================================================================
