//! The catalog: a bounded, sorted list of files for one category
//!
//! `select_category` rebuilds the whole list from the three roots in
//! priority order (flash, card, host). `attach_root` and `detach_root`
//! adjust the list for a single root without touching the others.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::classifier::{predicate_for, Classifier};
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::models::{Category, ScanOutcome, ScanReport, StorageClass};
use crate::progress::ProgressReporter;
use crate::roots::StorageRoots;
use crate::scanner::{scan_root, CancelToken, ScanContext};

/// Bounded media catalog over the registered storage roots
pub struct Catalog {
    roots: StorageRoots,
    config: CatalogConfig,
    ignored_dir: PathBuf,
    entries: Vec<PathBuf>,
    active: Option<(Category, Classifier)>,
    truncated: bool,
    last_report: ScanReport,
    cancel: CancelToken,
    reporter: ProgressReporter,
}

impl Catalog {
    /// Create an empty catalog over explicit roots
    pub fn new(roots: StorageRoots, config: CatalogConfig) -> Self {
        let ignored_dir = roots.ignored_dir(&config.ignored_subdir);
        let reporter = ProgressReporter::new(config.show_progress, config.progress_interval_ms);
        Self {
            roots,
            config,
            ignored_dir,
            entries: Vec::new(),
            active: None,
            truncated: false,
            last_report: ScanReport::new(),
            cancel: CancelToken::new(),
            reporter,
        }
    }

    /// Create an empty catalog, resolving roots from config and environment
    pub fn from_config(config: CatalogConfig) -> Self {
        let roots = StorageRoots::from_config(&config);
        Self::new(roots, config)
    }

    /// Clear the catalog and rebuild it for `category`.
    ///
    /// Returns `None`, leaving the catalog empty with no active category,
    /// when `category` has no classifier.
    pub fn select_category(&mut self, category: Category) -> Option<&[PathBuf]> {
        self.entries.clear();
        self.truncated = false;
        self.last_report = ScanReport::new();

        let Some(classify) = predicate_for(category) else {
            warn!("Cannot build a catalog for category {}", category);
            self.active = None;
            return None;
        };
        self.active = Some((category, classify));

        let roots: Vec<String> = self
            .roots
            .scan_order()
            .iter()
            .map(|(_, path)| path.to_string_lossy().to_string())
            .collect();
        self.reporter.report_start(category, roots, self.config.cap);

        let ctx = scan_context(
            &self.config,
            classify,
            &self.ignored_dir,
            &self.cancel,
            &self.reporter,
        );
        let mut report = ScanReport::new();
        for (class, root) in self.roots.scan_order() {
            debug!("Scanning {} root {:?} for {}", class, root, category);
            report.absorb(scan_root(root, &ctx, &mut self.entries));
            if report.outcome != ScanOutcome::Completed {
                break;
            }
        }
        self.cancel.reset();

        sort_by_basename(&mut self.entries);
        self.truncated = report.is_truncated();
        self.reporter.report_done(self.entries.len(), &report);
        info!(
            "Catalog for {}: {} entries ({:?}, {} errors, {}ms)",
            category,
            self.entries.len(),
            report.outcome,
            report.error_count(),
            report.duration_ms
        );
        self.last_report = report;

        Some(self.entries.as_slice())
    }

    /// Select a category by its integer code
    pub fn select_category_code(&mut self, code: i32) -> Option<&[PathBuf]> {
        self.select_category(Category::from_code(code))
    }

    /// Re-sort the entries by case-insensitive file name
    pub fn sort(&mut self) -> &[PathBuf] {
        sort_by_basename(&mut self.entries);
        &self.entries
    }

    /// Scan one root with the active classifier and append its matches.
    ///
    /// The result is not re-sorted; call [`Catalog::sort`] afterwards if
    /// order matters. An `Unknown` storage class changes nothing.
    pub fn attach_root(&mut self, class: StorageClass) -> Result<&[PathBuf], CatalogError> {
        let (category, classify) = self.active.ok_or(CatalogError::NoCategorySelected)?;
        let Some(root) = self.roots.path_for(class) else {
            debug!("Ignoring attach for storage class {}", class);
            return Ok(self.entries.as_slice());
        };

        let ctx = scan_context(
            &self.config,
            classify,
            &self.ignored_dir,
            &self.cancel,
            &self.reporter,
        );
        let report = scan_root(root, &ctx, &mut self.entries);
        self.cancel.reset();
        info!(
            "Attached {} root {:?}: {} new {} entries",
            class, root, report.matched_files, category
        );
        self.truncated |= report.is_truncated();
        self.last_report = report;

        Ok(self.entries.as_slice())
    }

    /// Drop every entry that lives under the root for `class`.
    ///
    /// Matching is by whole path components, so detaching `/mnt/sdcard`
    /// keeps `/mnt/sdcard2/...`. An `Unknown` storage class changes nothing.
    pub fn detach_root(&mut self, class: StorageClass) -> Result<&[PathBuf], CatalogError> {
        if self.active.is_none() {
            return Err(CatalogError::NoCategorySelected);
        }
        let Some(root) = self.roots.path_for(class) else {
            debug!("Ignoring detach for storage class {}", class);
            return Ok(self.entries.as_slice());
        };

        let before = self.entries.len();
        self.entries.retain(|entry| !entry.starts_with(root));
        info!(
            "Detached {} root {:?}: removed {} entries",
            class,
            root,
            before - self.entries.len()
        );

        Ok(self.entries.as_slice())
    }

    /// Current entries
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Entries as strings, for display
    pub fn to_strings(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The category the entries were built for, if any
    pub fn category(&self) -> Option<Category> {
        self.active.map(|(category, _)| category)
    }

    /// Whether a scan since the last category selection hit the cap
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Statistics from the most recent select or attach
    pub fn last_report(&self) -> &ScanReport {
        &self.last_report
    }

    pub fn roots(&self) -> &StorageRoots {
        &self.roots
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Token that stops a running scan at the next directory.
    ///
    /// A cancel applies to one scan only: the flag is cleared when that
    /// select or attach returns, so a cancel issued while idle stops just
    /// the next one.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

fn scan_context<'a>(
    config: &CatalogConfig,
    classify: Classifier,
    ignored_dir: &'a Path,
    cancel: &'a CancelToken,
    reporter: &'a ProgressReporter,
) -> ScanContext<'a> {
    ScanContext {
        classify,
        ignored_dir,
        cap: config.cap,
        follow_links: config.follow_links,
        max_depth: config.effective_max_depth(),
        cancel: Some(cancel),
        reporter: Some(reporter),
    }
}

/// Stable sort by lowercased file name; equal names keep their order
pub fn sort_by_basename(entries: &mut [PathBuf]) {
    entries.sort_by_cached_key(|path| basename_key(path));
}

fn basename_key(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().to_lowercase(),
        None => path.to_string_lossy().to_lowercase(),
    }
}
