//! Storage root registry
//!
//! Holds the three roots the catalog scans. Paths are resolved once, from
//! explicit configuration or the environment, and never change afterwards.

use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::config::CatalogConfig;
use crate::models::StorageClass;

pub const FLASH_ROOT_ENV: &str = "MEDIA_CATALOG_FLASH_ROOT";
pub const CARD_ROOT_ENV: &str = "MEDIA_CATALOG_CARD_ROOT";
pub const HOST_ROOT_ENV: &str = "MEDIA_CATALOG_HOST_ROOT";

pub const DEFAULT_FLASH_ROOT: &str = "/mnt/sdcard";
pub const DEFAULT_CARD_ROOT: &str = "/mnt/sd-ext";
pub const DEFAULT_HOST_ROOT: &str = "/mnt/uhost";

/// The registered storage roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoots {
    flash: PathBuf,
    card: PathBuf,
    host: PathBuf,
}

impl StorageRoots {
    /// Register three roots. Trailing separators are dropped and relative
    /// paths are anchored at the current directory.
    pub fn new(flash: impl AsRef<Path>, card: impl AsRef<Path>, host: impl AsRef<Path>) -> Self {
        Self {
            flash: normalize(flash.as_ref()),
            card: normalize(card.as_ref()),
            host: normalize(host.as_ref()),
        }
    }

    /// Resolve roots from config, then the environment, then defaults
    pub fn from_config(config: &CatalogConfig) -> Self {
        let roots = Self::new(
            resolve(config.flash_root.as_deref(), FLASH_ROOT_ENV, DEFAULT_FLASH_ROOT),
            resolve(config.card_root.as_deref(), CARD_ROOT_ENV, DEFAULT_CARD_ROOT),
            resolve(config.host_root.as_deref(), HOST_ROOT_ENV, DEFAULT_HOST_ROOT),
        );
        debug!("Storage roots: {:?}", roots);
        roots
    }

    pub fn flash(&self) -> &Path {
        &self.flash
    }

    pub fn card(&self) -> &Path {
        &self.card
    }

    pub fn host(&self) -> &Path {
        &self.host
    }

    /// Root for a storage class, `None` for `Unknown`
    pub fn path_for(&self, class: StorageClass) -> Option<&Path> {
        match class {
            StorageClass::Flash => Some(&self.flash),
            StorageClass::Card => Some(&self.card),
            StorageClass::Host => Some(&self.host),
            StorageClass::Unknown => None,
        }
    }

    /// Roots in scan priority order: flash, card, host
    pub fn scan_order(&self) -> [(StorageClass, &Path); 3] {
        [
            (StorageClass::Flash, self.flash.as_path()),
            (StorageClass::Card, self.card.as_path()),
            (StorageClass::Host, self.host.as_path()),
        ]
    }

    /// The card-relative directory that scans must skip
    pub fn ignored_dir(&self, subdir: &Path) -> PathBuf {
        self.card.join(subdir)
    }
}

fn resolve(explicit: Option<&Path>, env_key: &str, default: &str) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var_os(env_key) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(default),
    }
}

fn normalize(path: &Path) -> PathBuf {
    // Rebuilding from components drops trailing and doubled separators
    let cleaned: PathBuf = path.components().collect();
    if cleaned.is_absolute() {
        return cleaned;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(cleaned),
        Err(e) => {
            warn!("Cannot anchor relative root {:?}: {}", path, e);
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_separators() {
        let roots = StorageRoots::new("/flash/", "/card//", "/usb");
        assert_eq!(roots.flash(), Path::new("/flash"));
        assert_eq!(roots.card(), Path::new("/card"));
        assert_eq!(roots.host(), Path::new("/usb"));
    }

    #[test]
    fn test_relative_roots_become_absolute() {
        let roots = StorageRoots::new("flash", "/card", "/usb");
        assert!(roots.flash().is_absolute());
        assert!(roots.flash().ends_with("flash"));
    }

    #[test]
    fn test_path_for() {
        let roots = StorageRoots::new("/flash", "/card", "/usb");
        assert_eq!(roots.path_for(StorageClass::Flash), Some(Path::new("/flash")));
        assert_eq!(roots.path_for(StorageClass::Card), Some(Path::new("/card")));
        assert_eq!(roots.path_for(StorageClass::Host), Some(Path::new("/usb")));
        assert_eq!(roots.path_for(StorageClass::Unknown), None);
    }

    #[test]
    fn test_scan_order_is_flash_card_host() {
        let roots = StorageRoots::new("/flash", "/card", "/usb");
        let order: Vec<StorageClass> = roots.scan_order().iter().map(|(c, _)| *c).collect();
        assert_eq!(
            order,
            vec![StorageClass::Flash, StorageClass::Card, StorageClass::Host]
        );
    }

    #[test]
    fn test_ignored_dir_is_under_card() {
        let roots = StorageRoots::new("/flash", "/card/", "/usb");
        assert_eq!(
            roots.ignored_dir(Path::new("DCIM/.thumbnails")),
            PathBuf::from("/card/DCIM/.thumbnails")
        );
    }

    #[test]
    fn test_from_config_prefers_explicit_roots() {
        let config = CatalogConfig::builder()
            .flash_root("/a")
            .card_root("/b")
            .host_root("/c")
            .build();
        let roots = StorageRoots::from_config(&config);
        assert_eq!(roots, StorageRoots::new("/a", "/b", "/c"));
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let path = resolve(None, "MEDIA_CATALOG_TEST_UNSET_ROOT", "/mnt/default");
        assert_eq!(path, PathBuf::from("/mnt/default"));
    }

    #[test]
    fn test_resolve_reads_environment() {
        std::env::set_var("MEDIA_CATALOG_TEST_SET_ROOT", "/from/env");
        let path = resolve(None, "MEDIA_CATALOG_TEST_SET_ROOT", "/mnt/default");
        assert_eq!(path, PathBuf::from("/from/env"));
    }
}
