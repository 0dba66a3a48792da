//! # Sync Error Types
//!
//! Error types for the sync crate.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  Operation failures (vitrina-core::ErrorKind, re-exported here)        │
//! │  ├── Network / Timeout      - transient, caller may retry              │
//! │  ├── Decoding               - malformed remote payload                 │
//! │  ├── NotFound               - toggled product left the loaded window   │
//! │  ├── Unauthenticated        - no current user id                       │
//! │  └── Validation             - bad input, caught before I/O             │
//! │                                                                         │
//! │  ConfigError (this module)                                             │
//! │  ├── LoadFailed / SaveFailed - config file I/O                         │
//! │  └── Invalid                 - semantic problems (page_size = 0, ...)  │
//! │                                                                         │
//! │  Operation failures land in CatalogViewState.error; config errors      │
//! │  stay at construction time and never reach observers.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

pub use vitrina_core::ErrorKind;

/// Result type alias for engine operations.
pub type SyncResult<T> = Result<T, ErrorKind>;

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading/saving errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file.
    #[error("failed to load config: {0}")]
    LoadFailed(String),

    /// Failed to write the config file.
    #[error("failed to save config: {0}")]
    SaveFailed(String),

    /// The configuration is semantically invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}
