//! Scanner module - walks one storage root and appends matching files
//!
//! Traversal is depth-first and single-threaded. Directories are always
//! descended (except the ignored thumbnail cache); only regular files go
//! through the classifier. The cap is checked at insertion time and
//! reaching it ends the walk immediately.

use log::debug;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

use crate::classifier::{path_extension, Classifier};
use crate::error::ScanError;
use crate::models::{ScanOutcome, ScanReport};
use crate::progress::{ProgressReporter, ScanProgress};

/// Cooperative cancellation flag, checked before each directory is entered
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask any running scan holding this token to stop
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can gate the next scan
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Everything a root scan needs besides the root and the output list
pub struct ScanContext<'a> {
    /// Accepts or rejects a lowercased extension
    pub classify: Classifier,
    /// Absolute directory that is never entered (compared case-insensitively)
    pub ignored_dir: &'a Path,
    /// Maximum length of the output list
    pub cap: usize,
    /// Whether to descend through symbolic links
    pub follow_links: bool,
    /// Depth limit passed to walkdir
    pub max_depth: usize,
    /// Optional cancellation flag
    pub cancel: Option<&'a CancelToken>,
    /// Optional progress sink
    pub reporter: Option<&'a ProgressReporter>,
}

impl<'a> ScanContext<'a> {
    /// A context with unlimited depth, link following, and no observers
    pub fn new(classify: Classifier, ignored_dir: &'a Path, cap: usize) -> Self {
        Self {
            classify,
            ignored_dir,
            cap,
            follow_links: true,
            max_depth: usize::MAX,
            cancel: None,
            reporter: None,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|token| token.is_cancelled())
    }
}

/// Walk `root` and append every accepted file to `into`.
///
/// A missing or unreadable root contributes nothing. Problems below the
/// root are recorded in the returned report and the walk carries on with
/// the next sibling.
pub fn scan_root(root: &Path, ctx: &ScanContext<'_>, into: &mut Vec<PathBuf>) -> ScanReport {
    let start = Instant::now();
    let mut report = ScanReport::new();
    let ignored = ctx.ignored_dir.to_string_lossy().to_lowercase();
    let mut current_dir = String::new();

    let mut walker = WalkDir::new(root)
        .follow_links(ctx.follow_links)
        .max_depth(ctx.max_depth)
        .into_iter();

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(e) => {
                let error = ScanError::from(e);
                debug!("Skipping unreadable entry: {}", error);
                if let Some(reporter) = ctx.reporter {
                    reporter.report_error(&error);
                }
                report.errors.push(error);
                continue;
            }
        };

        let file_type = entry.file_type();

        if entry.depth() == 0 && !file_type.is_dir() {
            debug!("Root {:?} is not a directory", root);
            break;
        }

        if file_type.is_dir() {
            if entry.depth() > 0 && is_ignored(entry.path(), &ignored) {
                debug!("Ignoring reserved directory {:?}", entry.path());
                walker.skip_current_dir();
                report.ignored_dirs += 1;
                continue;
            }
            if ctx.is_cancelled() {
                debug!("Scan of {:?} cancelled", root);
                report.outcome = ScanOutcome::Cancelled;
                break;
            }
            report.total_dirs += 1;
            current_dir = entry.path().to_string_lossy().to_string();
            continue;
        }

        if !file_type.is_file() {
            continue;
        }

        if into.len() >= ctx.cap {
            debug!("Catalog cap of {} reached while scanning {:?}", ctx.cap, root);
            report.outcome = ScanOutcome::Truncated;
            break;
        }

        report.total_files += 1;
        if (ctx.classify)(&path_extension(entry.path())) {
            into.push(entry.into_path());
            report.matched_files += 1;
        }

        if let Some(reporter) = ctx.reporter.filter(|r| r.should_report()) {
            reporter.report_progress(&ScanProgress {
                matched_files: report.matched_files,
                scanned_files: report.total_files,
                scanned_dirs: report.total_dirs,
                current_dir: current_dir.clone(),
                elapsed_ms: start.elapsed().as_millis() as u64,
            });
        }
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        "Scanned {:?}: {} matched, {} files, {} dirs, {:?}",
        root, report.matched_files, report.total_files, report.total_dirs, report.outcome
    );
    report
}

fn is_ignored(path: &Path, ignored_lower: &str) -> bool {
    path.to_string_lossy().to_lowercase() == ignored_lower
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{is_audio, is_image};
    use crate::error::ScanErrorKind;
    use std::fs;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn test_scan_collects_nested_matches() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let a = touch(root, "a.mp3");
        let b = touch(root, "Music/Albums/b.FLAC");
        touch(root, "Music/notes.txt");
        touch(root, "Pictures/c.jpg");

        let ignored = root.join("none");
        let ctx = ScanContext::new(is_audio, &ignored, 500);
        let mut found = Vec::new();
        let report = scan_root(root, &ctx, &mut found);

        found.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(found, expected);
        assert_eq!(report.matched_files, 2);
        assert_eq!(report.total_files, 4);
        assert_eq!(report.outcome, ScanOutcome::Completed);
        assert!(found.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_scan_skips_ignored_dir_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let kept = touch(root, "DCIM/Camera/p.jpg");
        touch(root, "dcim/.Thumbnails/t.jpg");
        touch(root, "dcim/.Thumbnails/deeper/t2.jpg");

        let ignored = root.join("DCIM/.thumbnails");
        let ctx = ScanContext::new(is_image, &ignored, 500);
        let mut found = Vec::new();
        let report = scan_root(root, &ctx, &mut found);

        assert_eq!(found, vec![kept]);
        assert_eq!(report.ignored_dirs, 1);
    }

    #[test]
    fn test_missing_root_is_silently_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-mounted");
        let ctx = ScanContext::new(is_audio, &missing, 500);
        let mut found = Vec::new();
        let report = scan_root(&missing, &ctx, &mut found);

        assert!(found.is_empty());
        assert_eq!(report.outcome, ScanOutcome::Completed);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ScanErrorKind::NotFound);
    }

    #[test]
    fn test_root_that_is_a_file_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(dir.path(), "song.mp3");
        let ctx = ScanContext::new(is_audio, dir.path(), 500);
        let mut found = Vec::new();
        scan_root(&file, &ctx, &mut found);
        assert!(found.is_empty());
    }

    #[test]
    fn test_cap_aborts_scan() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..12 {
            touch(dir.path(), &format!("sub{}/track{}.mp3", i % 3, i));
        }

        let ignored = dir.path().join("none");
        let ctx = ScanContext::new(is_audio, &ignored, 5);
        let mut found = Vec::new();
        let report = scan_root(dir.path(), &ctx, &mut found);

        assert_eq!(found.len(), 5);
        assert_eq!(report.outcome, ScanOutcome::Truncated);
        assert!(report.is_truncated());
    }

    #[test]
    fn test_cap_counts_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.mp3");
        let ignored = dir.path().join("none");
        let ctx = ScanContext::new(is_audio, &ignored, 2);

        let mut found = vec![PathBuf::from("/elsewhere/x.mp3"), PathBuf::from("/elsewhere/y.mp3")];
        let report = scan_root(dir.path(), &ctx, &mut found);
        assert_eq!(found.len(), 2);
        assert_eq!(report.outcome, ScanOutcome::Truncated);
    }

    #[test]
    fn test_cancelled_token_stops_before_first_dir() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.mp3");
        let token = CancelToken::new();
        token.cancel();

        let ignored = dir.path().join("none");
        let mut ctx = ScanContext::new(is_audio, &ignored, 500);
        ctx.cancel = Some(&token);
        let mut found = Vec::new();
        let report = scan_root(dir.path(), &ctx, &mut found);

        assert!(found.is_empty());
        assert_eq!(report.outcome, ScanOutcome::Cancelled);

        token.reset();
        let report = scan_root(dir.path(), &ctx, &mut found);
        assert_eq!(found.len(), 1);
        assert_eq!(report.outcome, ScanOutcome::Completed);
    }

    #[test]
    fn test_max_depth_limits_recursion() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "top.mp3");
        touch(dir.path(), "a/b/deep.mp3");

        let ignored = dir.path().join("none");
        let mut ctx = ScanContext::new(is_audio, &ignored, 500);
        ctx.max_depth = 1;
        let mut found = Vec::new();
        scan_root(dir.path(), &ctx, &mut found);

        assert_eq!(found, vec![dir.path().join("top.mp3")]);
    }

    #[test]
    fn test_disabled_reporter_does_not_change_results() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.mp3");
        let reporter = ProgressReporter::disabled();

        let ignored = dir.path().join("none");
        let mut ctx = ScanContext::new(is_audio, &ignored, 500);
        ctx.reporter = Some(&reporter);
        let mut found = Vec::new();
        scan_root(dir.path(), &ctx, &mut found);

        assert_eq!(found, vec![a]);
        assert_eq!(reporter.next_seq(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_entry_does_not_stop_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let first = touch(dir.path(), "broken/a.mp3");
        let second = touch(dir.path(), "zzz/b.mp3");
        std::os::unix::fs::symlink(
            dir.path().join("gone"),
            dir.path().join("broken/dangling"),
        )
        .unwrap();

        let ignored = dir.path().join("none");
        let ctx = ScanContext::new(is_audio, &ignored, 500);
        let mut found = Vec::new();
        let report = scan_root(dir.path(), &ctx, &mut found);

        found.sort();
        assert_eq!(found, vec![first, second]);
        assert_eq!(report.outcome, ScanOutcome::Completed);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ScanErrorKind::NotFound);
        assert_eq!(
            report.errors[0].path,
            Some(dir.path().join("broken/dangling"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_reported_not_followed_forever() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "loop/a.mp3");
        std::os::unix::fs::symlink(dir.path().join("loop"), dir.path().join("loop/again"))
            .unwrap();

        let ignored = dir.path().join("none");
        let ctx = ScanContext::new(is_audio, &ignored, 500);
        let mut found = Vec::new();
        let report = scan_root(dir.path(), &ctx, &mut found);

        assert_eq!(found, vec![dir.path().join("loop/a.mp3")]);
        assert!(report
            .errors
            .iter()
            .any(|e| e.kind == ScanErrorKind::LinkLoop));
    }
}
