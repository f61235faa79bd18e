//! JSON output for scripting and automation.
//!
//! The whole run is emitted as one document once processing finishes.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "folders": [
//!     {
//!       "folder": "/data/reports",
//!       "duplicates": [
//!         {
//!           "file": "/data/reports/q1.csv",
//!           "archive": "/data/reports/q1.zip",
//!           "size": 4310,
//!           "crc32": 2839230611,
//!           "outcome": { "status": "deleted" }
//!         }
//!       ],
//!       "orphans": [],
//!       "skipped": [],
//!       "unreadable_archives": [],
//!       "ambiguous": [],
//!       "interrupted": false
//!     }
//!   ],
//!   "failed_folders": [],
//!   "summary": { "folders": 1, "duplicates": 1, "deleted": 1, ... }
//! }
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{Reporter, RunSummary};
use crate::pairing::{DuplicateRecord, OrphanRecord};
use crate::processor::{FolderReport, Outcome};

/// A folder that could not be listed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFolder {
    /// Folder path
    pub folder: PathBuf,
    /// Why it was skipped
    pub reason: String,
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Per-folder reports, in walk order
    pub folders: &'a [FolderReport],
    /// Folders that could not be listed
    pub failed_folders: &'a [FailedFolder],
    /// Run totals
    pub summary: &'a RunSummary,
}

/// Collects folder reports and writes them as one JSON document.
pub struct JsonReporter<W: Write> {
    writer: W,
    pretty: bool,
    folders: Vec<FolderReport>,
    failed_folders: Vec<FailedFolder>,
}

impl<W: Write> JsonReporter<W> {
    /// Create a JSON reporter.
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer,
            pretty,
            folders: Vec::new(),
            failed_folders: Vec::new(),
        }
    }

    /// Reports collected so far.
    pub fn folders(&self) -> &[FolderReport] {
        &self.folders
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn folder_started(&mut self, _folder: &Path) {}

    fn duplicate_found(&mut self, _record: &DuplicateRecord) {}

    fn orphan_found(&mut self, _record: &OrphanRecord) {}

    fn outcome(&mut self, _path: &Path, _outcome: &Outcome) {}

    fn folder_finished(&mut self, report: &FolderReport) {
        self.folders.push(report.clone());
    }

    fn folder_failed(&mut self, folder: &Path, reason: &str) {
        self.failed_folders.push(FailedFolder {
            folder: folder.to_path_buf(),
            reason: reason.to_string(),
        });
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        let output = JsonOutput {
            folders: &self.folders,
            failed_folders: &self.failed_folders,
            summary,
        };
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &output)?;
        } else {
            serde_json::to_writer(&mut self.writer, &output)?;
        }
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
