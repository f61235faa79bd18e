//! Reporting of per-folder results.
//!
//! This module provides two reporters for folder processing:
//! - Text, the line-oriented console format
//! - JSON for automation and scripting
//!
//! Both receive the same [`Reporter`] events from the
//! [`FolderProcessor`](crate::processor::FolderProcessor), so the mode
//! (dry run or execute) never changes what gets discovered, only which
//! outcome lines follow.
//!
//! # Example
//!
//! ```no_run
//! use zipsweep::output::{Reporter, TextReporter};
//! use zipsweep::processor::{FolderProcessor, ProcessorConfig};
//! use std::path::Path;
//!
//! let processor = FolderProcessor::new(ProcessorConfig::default());
//! let mut reporter = TextReporter::new(std::io::stdout(), false);
//!
//! let report = processor.process(Path::new("."), &mut reporter).unwrap();
//! reporter.finish(&zipsweep::output::RunSummary::from_reports([&report])).unwrap();
//! ```

pub mod json;
pub mod text;

use std::io;
use std::path::Path;

use serde::Serialize;

use crate::pairing::{DuplicateRecord, OrphanRecord};
use crate::processor::{FolderReport, Outcome};

pub use json::JsonReporter;
pub use text::TextReporter;

/// Receives processing events as they happen.
///
/// Methods are infallible so a broken output stream never interrupts a
/// half-finished folder; writers keep the first error and return it from
/// [`Reporter::finish`].
pub trait Reporter {
    /// A folder is about to be processed.
    fn folder_started(&mut self, folder: &Path);

    /// A verified duplicate was found.
    fn duplicate_found(&mut self, record: &DuplicateRecord);

    /// An orphan was found (only when orphan compression is requested).
    fn orphan_found(&mut self, record: &OrphanRecord);

    /// The action for the last reported file completed.
    fn outcome(&mut self, path: &Path, outcome: &Outcome);

    /// A folder finished processing.
    fn folder_finished(&mut self, report: &FolderReport);

    /// A folder could not be listed and was skipped.
    fn folder_failed(&mut self, folder: &Path, reason: &str);

    /// Emit the run summary and flush.
    ///
    /// # Errors
    ///
    /// Returns the first write error encountered during the run.
    fn finish(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Totals over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Folders processed
    pub folders: usize,
    /// Folders that could not be listed
    pub folder_errors: usize,
    /// Verified duplicates found
    pub duplicates: usize,
    /// Bytes held by those duplicates
    pub duplicate_bytes: u64,
    /// Orphans found
    pub orphans: usize,
    /// Duplicates deleted
    pub deleted: usize,
    /// Orphans compressed
    pub compressed: usize,
    /// Duplicates left because they changed after classification
    pub changed: usize,
    /// Failed deletions and compressions
    pub failed: usize,
    /// Files that could not be checksummed
    pub skipped_files: usize,
    /// Archives that could not be read
    pub unreadable_archives: usize,
    /// Whether the run was interrupted
    pub interrupted: bool,
}

impl RunSummary {
    /// Add one folder's report to the totals.
    pub fn record(&mut self, report: &FolderReport) {
        self.folders += 1;
        self.duplicates += report.duplicates.len();
        self.duplicate_bytes += report.duplicates.iter().map(|d| d.size).sum::<u64>();
        self.orphans += report.orphans.len();
        self.skipped_files += report.skipped.len();
        self.unreadable_archives += report.unreadable_archives.len();
        self.interrupted |= report.interrupted;

        let outcomes = report
            .duplicates
            .iter()
            .map(|d| &d.outcome)
            .chain(report.orphans.iter().map(|o| &o.outcome));
        for outcome in outcomes {
            match outcome {
                Outcome::Deleted => self.deleted += 1,
                Outcome::Compressed => self.compressed += 1,
                Outcome::Skipped { .. } => self.changed += 1,
                Outcome::Failed { .. } => self.failed += 1,
                Outcome::DryRun => {}
            }
        }
    }

    /// Build totals from a set of reports.
    #[must_use]
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a FolderReport>) -> Self {
        let mut summary = Self::default();
        for report in reports {
            summary.record(report);
        }
        summary
    }
}
