//! # Catalog Configuration
//!
//! Configuration management for the catalog sync engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VITRINA_PAGE_SIZE=30                                               │
//! │     VITRINA_FETCH_TIMEOUT_SECS=10                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/vitrina/catalog.toml (Linux)                             │
//! │     ~/Library/Application Support/app.vitrina/catalog.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     page_size = 20, fetch_timeout_secs = 30                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # catalog.toml
//! [catalog]
//! page_size = 20            # products per remote page (history: 10/20/30)
//! fetch_timeout_secs = 30   # deadline for each remote call
//!
//! [cache]
//! enabled = true
//! file_name = "catalog_snapshot.json"
//! # dir = "/tmp/vitrina"    # override the platform data directory
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vitrina_core::{validation, DEFAULT_PAGE_SIZE};

use crate::error::ConfigError;

// =============================================================================
// Catalog Settings
// =============================================================================

/// Paging and remote-call behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Products requested per remote page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Deadline for each remote call (seconds). The remote contract itself
    /// implies no timeout, so the engine imposes one.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            page_size: default_page_size(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

// =============================================================================
// Cache Settings
// =============================================================================

/// Snapshot cache behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Enables the on-disk snapshot. When off, the engine neither saves nor
    /// hydrates.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Snapshot file name inside the data directory.
    #[serde(default = "default_cache_file")]
    pub file_name: String,

    /// Explicit data directory. `None` resolves the platform default.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_cache_file() -> String {
    "catalog_snapshot.json".to_string()
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            enabled: true,
            file_name: default_cache_file(),
            dir: None,
        }
    }
}

impl CacheSettings {
    /// Resolves the full snapshot file path, if any directory is available.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        let dir = self.dir.clone().or_else(default_data_dir)?;
        Some(dir.join(&self.file_name))
    }
}

fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("app", "vitrina", "vitrina")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

// =============================================================================
// Main Catalog Configuration
// =============================================================================

/// Complete catalog engine configuration.
///
/// ## Example Config File
/// ```toml
/// [catalog]
/// page_size = 20
/// fetch_timeout_secs = 30
///
/// [cache]
/// enabled = true
/// file_name = "catalog_snapshot.json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Paging and remote-call settings.
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Snapshot cache settings.
    #[serde(default)]
    pub cache: CacheSettings,
}

impl CatalogConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (catalog.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Try to load from config file
        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading catalog config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load catalog config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> Result<(), ConfigError> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Catalog config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_page_size(self.catalog.page_size)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.catalog.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.cache.enabled && self.cache.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "cache.file_name must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // Page size
        if let Ok(size) = std::env::var("VITRINA_PAGE_SIZE") {
            if let Ok(s) = size.parse::<usize>() {
                debug!(page_size = s, "Overriding page size from environment");
                self.catalog.page_size = s;
            }
        }

        // Fetch timeout
        if let Ok(timeout) = std::env::var("VITRINA_FETCH_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse::<u64>() {
                debug!(timeout_secs = t, "Overriding fetch timeout from environment");
                self.catalog.fetch_timeout_secs = t;
            }
        }

        // Cache toggle
        if let Ok(enabled) = std::env::var("VITRINA_CACHE_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.cache.enabled = true,
                "0" | "false" | "no" => self.cache.enabled = false,
                other => warn!(value = %other, "Unknown VITRINA_CACHE_ENABLED value"),
            }
        }

        // Cache directory
        if let Ok(dir) = std::env::var("VITRINA_CACHE_DIR") {
            self.cache.dir = Some(PathBuf::from(dir));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("app", "vitrina", "vitrina")
            .map(|dirs| dirs.config_dir().join("catalog.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the configured page size.
    pub fn page_size(&self) -> usize {
        self.catalog.page_size
    }

    /// Returns the remote-call deadline.
    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.catalog.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert_eq!(config.catalog.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.catalog.fetch_timeout_secs, 30);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.file_name, "catalog_snapshot.json");
    }

    #[test]
    fn test_config_validation() {
        let mut config = CatalogConfig::default();
        assert!(config.validate().is_ok());

        // Zero page size never terminates pagination
        config.catalog.page_size = 0;
        assert!(config.validate().is_err());

        config.catalog.page_size = 20;
        config.catalog.fetch_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.catalog.fetch_timeout_secs = 30;
        config.cache.file_name = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = CatalogConfig::default();
        config.catalog.page_size = 30;
        config.cache.dir = Some(PathBuf::from("/tmp/vitrina"));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[catalog]"));
        assert!(toml_str.contains("[cache]"));

        let parsed: CatalogConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.catalog.page_size, 30);
        assert_eq!(parsed.cache.dir, Some(PathBuf::from("/tmp/vitrina")));
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let parsed: CatalogConfig = toml::from_str("[catalog]\npage_size = 10\n").unwrap();
        assert_eq!(parsed.catalog.page_size, 10);
        assert_eq!(parsed.catalog.fetch_timeout_secs, 30);
        assert!(parsed.cache.enabled);
    }

    #[test]
    fn test_snapshot_path_honors_dir_override() {
        let mut settings = CacheSettings::default();
        settings.dir = Some(PathBuf::from("/data/vitrina"));
        assert_eq!(
            settings.snapshot_path(),
            Some(PathBuf::from("/data/vitrina/catalog_snapshot.json"))
        );
    }
}
