//! Configuration for the media catalog

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CatalogError;

/// Default maximum number of catalog entries
pub const DEFAULT_CATALOG_CAP: usize = 500;

/// Default card-relative directory that is never scanned
pub const DEFAULT_IGNORED_SUBDIR: &str = "DCIM/.thumbnails";

/// Default interval between progress lines
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 500;

/// Configuration for the catalog engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Internal flash root; falls back to the environment when unset
    pub flash_root: Option<PathBuf>,

    /// Removable card root; falls back to the environment when unset
    pub card_root: Option<PathBuf>,

    /// Host-attached volume root; falls back to the environment when unset
    pub host_root: Option<PathBuf>,

    /// Maximum number of entries, enforced across all roots of a scan
    pub cap: usize,

    /// Card-relative directory pruned from every scan
    pub ignored_subdir: PathBuf,

    /// Whether to descend through symbolic links to directories
    pub follow_links: bool,

    /// Optional recursion limit below each root
    /// None means unlimited
    pub max_depth: Option<usize>,

    /// Whether to emit JSON progress lines on stderr
    pub show_progress: bool,

    /// Minimum interval between progress lines
    pub progress_interval_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            flash_root: None,
            card_root: None,
            host_root: None,
            cap: DEFAULT_CATALOG_CAP,
            ignored_subdir: PathBuf::from(DEFAULT_IGNORED_SUBDIR),
            follow_links: true,
            max_depth: None,
            show_progress: false,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}

impl CatalogConfig {
    /// Create a config builder
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder::new()
    }

    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| CatalogError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the effective max depth for walkdir
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.unwrap_or(usize::MAX)
    }
}

/// Builder for CatalogConfig
#[derive(Debug, Default)]
pub struct CatalogConfigBuilder {
    config: CatalogConfig,
}

impl CatalogConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing config
    pub fn from_config(config: CatalogConfig) -> Self {
        Self { config }
    }

    pub fn flash_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.flash_root = Some(path.into());
        self
    }

    pub fn card_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.card_root = Some(path.into());
        self
    }

    pub fn host_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.host_root = Some(path.into());
        self
    }

    /// Set the catalog cap
    pub fn cap(mut self, cap: usize) -> Self {
        self.config.cap = cap;
        self
    }

    /// Set the card-relative ignored directory
    pub fn ignored_subdir(mut self, subdir: impl Into<PathBuf>) -> Self {
        self.config.ignored_subdir = subdir.into();
        self
    }

    /// Enable or disable following symbolic links
    pub fn follow_links(mut self, enabled: bool) -> Self {
        self.config.follow_links = enabled;
        self
    }

    /// Limit recursion depth below each root
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Enable or disable stderr progress
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.config.show_progress = enabled;
        self
    }

    pub fn progress_interval_ms(mut self, interval: u64) -> Self {
        self.config.progress_interval_ms = interval;
        self
    }

    /// Build the config
    pub fn build(self) -> CatalogConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert!(config.flash_root.is_none());
        assert_eq!(config.cap, DEFAULT_CATALOG_CAP);
        assert_eq!(config.ignored_subdir, PathBuf::from("DCIM/.thumbnails"));
        assert!(config.follow_links);
        assert_eq!(config.effective_max_depth(), usize::MAX);
    }

    #[test]
    fn test_config_builder() {
        let config = CatalogConfig::builder()
            .flash_root("/flash")
            .card_root("/card")
            .host_root("/usb")
            .cap(10)
            .max_depth(Some(4))
            .follow_links(false)
            .build();

        assert_eq!(config.flash_root, Some(PathBuf::from("/flash")));
        assert_eq!(config.card_root, Some(PathBuf::from("/card")));
        assert_eq!(config.host_root, Some(PathBuf::from("/usb")));
        assert_eq!(config.cap, 10);
        assert_eq!(config.effective_max_depth(), 4);
        assert!(!config.follow_links);
    }

    #[test]
    fn test_from_json_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "card_root": "/card", "cap": 42 }}"#).unwrap();

        let config = CatalogConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.card_root, Some(PathBuf::from("/card")));
        assert_eq!(config.cap, 42);
        assert!(config.flash_root.is_none());
        assert_eq!(config.progress_interval_ms, DEFAULT_PROGRESS_INTERVAL_MS);
    }

    #[test]
    fn test_from_json_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "cap = 3").unwrap();

        let err = CatalogConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Config { .. }));
    }

    #[test]
    fn test_from_json_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = CatalogConfig::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
