//! Bounded media catalog over removable and internal storage
//!
//! This library walks the internal flash, removable card, and host-attached
//! roots, classifies files by extension, and keeps a single sorted catalog
//! that can be rebuilt per category or patched one root at a time.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod progress;
pub mod roots;
pub mod scanner;

pub use catalog::{sort_by_basename, Catalog};
pub use classifier::{extension_of, predicate_for, Classifier};
pub use config::CatalogConfig;
pub use error::{CatalogError, ScanError, ScanErrorKind};
pub use models::{Category, ScanOutcome, ScanReport, StorageClass};
pub use progress::{
    DoneMessage, Envelope, ErrorProgressMessage, ProgressEvent, ProgressMessage, ProgressReporter,
    StartMessage,
};
pub use roots::StorageRoots;
pub use scanner::{scan_root, CancelToken, ScanContext};
