//! Error types for the media catalog

use std::path::PathBuf;
use thiserror::Error;

/// Error kinds that can occur while walking a storage root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// Permission denied when accessing a file or directory
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// Symbolic link points back at one of its ancestors
    LinkLoop,
    /// I/O error during directory listing
    IoError,
    /// Unknown error
    Unknown,
}

/// A traversal problem, recorded in the scan report instead of raised
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message} (path: {path:?})")]
pub struct ScanError {
    /// The kind of error
    pub kind: ScanErrorKind,
    /// The path where the error occurred
    pub path: Option<PathBuf>,
    /// Human-readable error message
    pub message: String,
}

impl ScanError {
    /// Create a new scan error
    pub fn new(kind: ScanErrorKind, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(path: PathBuf) -> Self {
        Self::new(
            ScanErrorKind::PermissionDenied,
            Some(path.clone()),
            format!("Permission denied: {:?}", path),
        )
    }

    /// Create an I/O error
    pub fn io_error(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::IoError, path, message)
    }
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => ScanErrorKind::PermissionDenied,
            std::io::ErrorKind::NotFound => ScanErrorKind::NotFound,
            _ => ScanErrorKind::IoError,
        };
        Self::new(kind, None, err.to_string())
    }
}

impl From<walkdir::Error> for ScanError {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .or_else(|| err.loop_ancestor())
            .map(|p| p.to_path_buf());
        let kind = if err.loop_ancestor().is_some() {
            ScanErrorKind::LinkLoop
        } else {
            match err.io_error().map(|e| e.kind()) {
                Some(std::io::ErrorKind::PermissionDenied) => ScanErrorKind::PermissionDenied,
                Some(std::io::ErrorKind::NotFound) => ScanErrorKind::NotFound,
                Some(_) => ScanErrorKind::IoError,
                None => ScanErrorKind::Unknown,
            }
        };
        Self::new(kind, path, err.to_string())
    }
}

/// Errors surfaced by catalog operations and configuration loading
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Attach or detach was called before any category was selected
    #[error("no category selected; call select_category first")]
    NoCategorySelected,

    /// A category name or code did not map to a scannable category
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Configuration file could not be parsed
    #[error("invalid configuration in {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
