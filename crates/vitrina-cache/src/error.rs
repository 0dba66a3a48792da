//! # Cache Error Types
//!
//! Error types for snapshot operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CacheError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Swallowed at the crate boundary:                                      │
//! │    save() logs a warning and returns ()                                │
//! │    load() logs and returns None                                        │
//! │                                                                         │
//! │  Snapshot persistence is best-effort by contract: a failed write       │
//! │  must never fail the user-visible operation that triggered it.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Snapshot operation errors.
///
/// These never cross the crate boundary on the public `save`/`load` paths;
/// the `try_*` variants expose them for tests and callers that want the
/// cause.
#[derive(Debug, Error)]
pub enum CacheError {
    /// File system operation failed.
    ///
    /// ## When This Occurs
    /// - Snapshot directory cannot be created
    /// - Disk full, permissions, missing file on read
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot blob could not be encoded or decoded.
    ///
    /// ## When This Occurs
    /// - On-disk blob was truncated or hand-edited
    /// - Schema drift between app versions
    #[error("snapshot serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CacheError {
    /// True when the underlying cause is simply a missing snapshot file.
    ///
    /// A missing file is the expected cold-start case and is logged at
    /// debug level; everything else warns.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, CacheError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type for snapshot operations.
pub type CacheResult<T> = Result<T, CacheError>;
