//! Progress reporting for catalog builds
//!
//! Each event is written to stderr as one JSON line wrapped in an
//! [`Envelope`] carrying the event tag, a sequence number, and a
//! timestamp relative to reporter creation.

use serde::Serialize;
use std::cell::Cell;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::error::ScanError;
use crate::models::{Category, ScanOutcome, ScanReport};

/// A payload that can be emitted by the reporter
pub trait ProgressEvent: Serialize {
    /// Value of the `_t` field
    const TAG: &'static str;
}

/// Common framing for every progress line
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    pub seq: u64,
    /// Milliseconds since the reporter was created
    pub ts: u64,
    #[serde(flatten)]
    pub body: T,
}

/// Running counters while a root is walked
#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    pub matched_files: u64,
    pub scanned_files: u64,
    pub scanned_dirs: u64,
    /// Directory most recently entered
    pub current_dir: String,
    pub elapsed_ms: u64,
}

/// Emitted once when a category build begins
#[derive(Debug, Clone, Serialize)]
pub struct StartMessage {
    pub category: Category,
    /// Roots in scan order
    pub roots: Vec<String>,
    pub cap: usize,
}

impl ProgressEvent for StartMessage {
    const TAG: &'static str = "start";
}

/// Periodic scan counters
#[derive(Debug, Clone, Serialize)]
pub struct ProgressMessage {
    #[serde(rename = "m")]
    pub matched: u64,
    #[serde(rename = "f")]
    pub files: u64,
    #[serde(rename = "d")]
    pub dirs: u64,
    pub dir: String,
    pub ms: u64,
}

impl ProgressEvent for ProgressMessage {
    const TAG: &'static str = "p";
}

impl From<&ScanProgress> for ProgressMessage {
    fn from(progress: &ScanProgress) -> Self {
        Self {
            matched: progress.matched_files,
            files: progress.scanned_files,
            dirs: progress.scanned_dirs,
            dir: progress.current_dir.clone(),
            ms: progress.elapsed_ms,
        }
    }
}

/// A directory or entry that could not be read
#[derive(Debug, Clone, Serialize)]
pub struct ErrorProgressMessage {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ProgressEvent for ErrorProgressMessage {
    const TAG: &'static str = "err";
}

impl From<&ScanError> for ErrorProgressMessage {
    fn from(error: &ScanError) -> Self {
        Self {
            error_type: format!("{:?}", error.kind),
            message: error.message.clone(),
            path: error.path.as_ref().map(|p| p.to_string_lossy().to_string()),
        }
    }
}

/// Final summary of a category build
#[derive(Debug, Clone, Serialize)]
pub struct DoneMessage {
    #[serde(rename = "n")]
    pub entries: usize,
    #[serde(rename = "tf")]
    pub total_files: u64,
    #[serde(rename = "td")]
    pub total_dirs: u64,
    #[serde(rename = "ec")]
    pub error_count: usize,
    pub outcome: ScanOutcome,
    pub ms: u64,
}

impl ProgressEvent for DoneMessage {
    const TAG: &'static str = "done";
}

impl DoneMessage {
    pub fn new(entries: usize, report: &ScanReport) -> Self {
        Self {
            entries,
            total_files: report.total_files,
            total_dirs: report.total_dirs,
            error_count: report.error_count(),
            outcome: report.outcome,
            ms: report.duration_ms,
        }
    }
}

/// Writes progress events to stderr.
///
/// Progress lines are rate limited to one per interval; start, error and
/// done events always go out. A disabled reporter swallows everything.
pub struct ProgressReporter {
    enabled: bool,
    interval_ms: u64,
    last_report: Cell<Instant>,
    seq: AtomicU64,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(enabled: bool, interval_ms: u64) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            interval_ms,
            last_report: Cell::new(now),
            seq: AtomicU64::new(0),
            start_time: now,
        }
    }

    /// A reporter that never writes
    pub fn disabled() -> Self {
        Self::new(false, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True once the interval has elapsed since the last progress line
    pub fn should_report(&self) -> bool {
        self.enabled && self.last_report.get().elapsed().as_millis() as u64 >= self.interval_ms
    }

    /// Next sequence number (monotonically increasing)
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Wrap an event in its envelope, consuming a sequence number
    pub fn envelope<T: ProgressEvent>(&self, body: T) -> Envelope<T> {
        Envelope {
            msg_type: T::TAG,
            seq: self.next_seq(),
            ts: self.start_time.elapsed().as_millis() as u64,
            body,
        }
    }

    fn emit<T: ProgressEvent>(&self, body: T) {
        if !self.enabled {
            return;
        }
        if let Ok(json) = serde_json::to_string(&self.envelope(body)) {
            eprintln!("{}", json);
            std::io::stderr().flush().ok();
        }
    }

    pub fn report_start(&self, category: Category, roots: Vec<String>, cap: usize) {
        self.emit(StartMessage {
            category,
            roots,
            cap,
        });
    }

    /// Returns true if a line was written
    pub fn report_progress(&self, progress: &ScanProgress) -> bool {
        if !self.should_report() {
            return false;
        }
        self.emit(ProgressMessage::from(progress));
        self.last_report.set(Instant::now());
        true
    }

    pub fn report_error(&self, error: &ScanError) {
        self.emit(ErrorProgressMessage::from(error));
    }

    pub fn report_done(&self, entries: usize, report: &ScanReport) {
        self.emit(DoneMessage::new(entries, report));
    }
}
