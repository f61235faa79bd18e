//! Line-oriented console output.
//!
//! ```text
//!
//! Processing folder: /data/reports
//!   Duplicate found: q1.csv -> q1.zip
//!     [DELETED]
//!   Orphan: q2.csv
//!     [COMPRESSED]
//!
//! Summary: 1 duplicate(s) (4.2 KiB), 1 orphan(s), 1 deleted, 1 compressed, 0 failed
//! ```

use std::io::{self, Write};
use std::path::Path;

use bytesize::ByteSize;
use yansi::{Color, Paint};

use super::{Reporter, RunSummary};
use crate::pairing::{DuplicateRecord, OrphanRecord};
use crate::processor::{FolderReport, Outcome};

/// Writes the human-readable report.
pub struct TextReporter<W: Write> {
    writer: W,
    color: bool,
    error: Option<io::Error>,
}

impl<W: Write> TextReporter<W> {
    /// Create a text reporter; `color` enables ANSI styling of outcome tags.
    pub fn new(writer: W, color: bool) -> Self {
        Self {
            writer,
            color,
            error: None,
        }
    }

    fn tag(&self, text: &str, color: Color) -> String {
        if self.color {
            text.fg(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, line: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.writer.write_fmt(line).and_then(|()| self.writer.write_all(b"\n")) {
            log::debug!("Report output failed: {}", e);
            self.error = Some(e);
        }
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn folder_started(&mut self, folder: &Path) {
        self.line(format_args!("\nProcessing folder: {}", folder.display()));
    }

    fn duplicate_found(&mut self, record: &DuplicateRecord) {
        self.line(format_args!(
            "  Duplicate found: {} -> {}",
            record.file.file_name,
            record.archive_name()
        ));
    }

    fn orphan_found(&mut self, record: &OrphanRecord) {
        self.line(format_args!("  Orphan: {}", record.file.file_name));
    }

    fn outcome(&mut self, _path: &Path, outcome: &Outcome) {
        let line = match outcome {
            Outcome::DryRun => return,
            Outcome::Deleted => self.tag("[DELETED]", Color::Green),
            Outcome::Compressed => self.tag("[COMPRESSED]", Color::Green),
            Outcome::Skipped { reason } => {
                format!("{} {}", self.tag("[SKIPPED]", Color::Yellow), reason)
            }
            Outcome::Failed { reason } => {
                format!("{} {}", self.tag("[FAILED]", Color::Red), reason)
            }
        };
        self.line(format_args!("    {line}"));
    }

    fn folder_finished(&mut self, _report: &FolderReport) {}

    fn folder_failed(&mut self, folder: &Path, reason: &str) {
        let tag = self.tag("[FAILED]", Color::Red);
        self.line(format_args!(
            "\nProcessing folder: {}\n  {} {}",
            folder.display(),
            tag,
            reason
        ));
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.line(format_args!(
            "\nSummary: {} duplicate(s) ({}), {} orphan(s), {} deleted, {} compressed, {} failed",
            summary.duplicates,
            ByteSize::b(summary.duplicate_bytes),
            summary.orphans,
            summary.deleted,
            summary.compressed,
            summary.failed
        ));
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()
    }
}
