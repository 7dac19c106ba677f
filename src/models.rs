//! Core data models for the media catalog

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::classifier;
use crate::error::{CatalogError, ScanError};

/// Content category assigned to a file by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Audio files (mp3, flac, wav, etc.)
    Audio,
    /// Video files (mp4, mkv, avi, etc.)
    Video,
    /// Ebooks and plain text (epub, pdf, txt, etc.)
    Ebook,
    /// Image files (jpg, png, webp, etc.)
    Image,
    /// Installable application packages (apk)
    Package,
    /// Not a scannable category
    Unknown,
}

impl Category {
    /// Every category that has a classifier, in code order
    pub const SCANNABLE: [Category; 5] = [
        Category::Audio,
        Category::Video,
        Category::Ebook,
        Category::Image,
        Category::Package,
    ];

    /// Canonical code for `Unknown`
    pub const UNKNOWN_CODE: i32 = 0xff;

    /// Infer category from a file extension
    pub fn from_extension(ext: &str) -> Self {
        let ext_lower = ext.to_lowercase();
        Self::SCANNABLE
            .into_iter()
            .find(|category| {
                classifier::predicate_for(*category).is_some_and(|classify| classify(&ext_lower))
            })
            .unwrap_or(Category::Unknown)
    }

    /// Map an integer selector code; anything outside 1..=5 is `Unknown`
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Category::Audio,
            2 => Category::Video,
            3 => Category::Ebook,
            4 => Category::Image,
            5 => Category::Package,
            _ => Category::Unknown,
        }
    }

    /// Integer selector code
    pub fn code(&self) -> i32 {
        match self {
            Category::Audio => 1,
            Category::Video => 2,
            Category::Ebook => 3,
            Category::Image => 4,
            Category::Package => 5,
            Category::Unknown => Self::UNKNOWN_CODE,
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Ebook => "ebook",
            Category::Image => "image",
            Category::Package => "package",
            Category::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audio" | "music" => Ok(Category::Audio),
            "video" | "movie" => Ok(Category::Video),
            "ebook" | "book" => Ok(Category::Ebook),
            "image" | "picture" => Ok(Category::Image),
            "package" | "apk" => Ok(Category::Package),
            other => Err(CatalogError::UnknownCategory(other.to_string())),
        }
    }
}

/// Which storage root an attach/detach operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageClass {
    /// Host-attached external volume (USB)
    Host,
    /// Removable memory card
    Card,
    /// Internal flash partition
    Flash,
    /// Not a registered root
    Unknown,
}

impl StorageClass {
    /// Map an integer selector code; anything outside 1..=3 is `Unknown`
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => StorageClass::Host,
            2 => StorageClass::Card,
            3 => StorageClass::Flash,
            _ => StorageClass::Unknown,
        }
    }

    /// Integer selector code
    pub fn code(&self) -> i32 {
        match self {
            StorageClass::Host => 1,
            StorageClass::Card => 2,
            StorageClass::Flash => 3,
            StorageClass::Unknown => 4,
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::Host => "host",
            StorageClass::Card => "card",
            StorageClass::Flash => "flash",
            StorageClass::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StorageClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "host" | "usb" => Ok(StorageClass::Host),
            "card" | "sdcard" => Ok(StorageClass::Card),
            "flash" | "internal" => Ok(StorageClass::Flash),
            other => Err(format!("unknown storage class: {other}")),
        }
    }
}

/// How a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanOutcome {
    /// The whole tree was walked
    #[default]
    Completed,
    /// Stopped because the catalog reached its cap
    Truncated,
    /// Stopped because the cancel token was set
    Cancelled,
}

impl ScanOutcome {
    /// Combine the outcomes of consecutive root scans
    pub fn merge(self, next: ScanOutcome) -> ScanOutcome {
        match (self, next) {
            (ScanOutcome::Cancelled, _) | (_, ScanOutcome::Cancelled) => ScanOutcome::Cancelled,
            (ScanOutcome::Truncated, _) | (_, ScanOutcome::Truncated) => ScanOutcome::Truncated,
            _ => ScanOutcome::Completed,
        }
    }
}

/// Statistics for one or more root scans
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Number of files appended to the catalog
    pub matched_files: u64,
    /// Number of regular files examined
    pub total_files: u64,
    /// Number of directories descended into
    pub total_dirs: u64,
    /// Number of directories pruned by the ignore rule
    pub ignored_dirs: u64,
    /// How the scan ended
    pub outcome: ScanOutcome,
    /// Errors encountered during scanning
    #[serde(skip)]
    pub errors: Vec<ScanError>,
    /// Total scan duration in milliseconds
    pub duration_ms: u64,
}

impl ScanReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another report into this one
    pub fn absorb(&mut self, other: ScanReport) {
        self.matched_files += other.matched_files;
        self.total_files += other.total_files;
        self.total_dirs += other.total_dirs;
        self.ignored_dirs += other.ignored_dirs;
        self.outcome = self.outcome.merge(other.outcome);
        self.errors.extend(other.errors);
        self.duration_ms += other.duration_ms;
    }

    /// Get the number of errors
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Whether the cap cut the scan short
    pub fn is_truncated(&self) -> bool {
        self.outcome == ScanOutcome::Truncated
    }
}
