//! Per-folder orchestration: classify, report, then optionally act.
//!
//! # Overview
//!
//! [`FolderProcessor::process`] handles exactly one folder, never its
//! subfolders:
//!
//! 1. Classify the folder with the [`PairingResolver`] (read-only).
//! 2. For each duplicate: report it; when executing, re-confirm it against
//!    the live file and archive, then delete the loose file.
//! 3. When orphan compression is requested, for each orphan: report it;
//!    when executing, compress and verify it and delete the source only
//!    after verification succeeded.
//!
//! Discovery is reported identically with and without `execute`; the
//! mutations are a separate step gated by that single flag. Every per-file
//! failure is recorded in the [`FolderReport`] and processing moves on.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::actions::{delete_file, DeleteConfig};
use crate::archive::{CompressOptions, Compression, Compressor, CreatedArchive};
use crate::output::Reporter;
use crate::pairing::{
    AmbiguousGroup, DuplicateRecord, OrphanRecord, PairingResolver, ResolverConfig, SkippedFile,
};
use crate::scanner::ScanError;

/// What happened to one reported file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Reported only (execute disabled)
    DryRun,
    /// Duplicate removed
    Deleted,
    /// Orphan archived, verified, and source removed
    Compressed,
    /// Left in place because it changed since classification
    Skipped { reason: String },
    /// The action failed; the file was left in place
    Failed { reason: String },
}

/// A duplicate and what was done with it.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateOutcome {
    /// Loose file
    pub file: PathBuf,
    /// Archive holding the identical member
    pub archive: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Shared CRC-32
    pub crc32: u32,
    /// Action result
    pub outcome: Outcome,
}

/// An orphan and what was done with it.
#[derive(Debug, Clone, Serialize)]
pub struct OrphanOutcome {
    /// Loose file
    pub file: PathBuf,
    /// Target archive path
    pub archive: PathBuf,
    /// Size in bytes at listing time
    pub size: u64,
    /// Action result
    pub outcome: Outcome,
}

/// Everything found and done in one folder.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderReport {
    /// Folder processed
    pub folder: PathBuf,
    /// Duplicates found
    pub duplicates: Vec<DuplicateOutcome>,
    /// Orphans found (empty unless orphan compression was requested)
    pub orphans: Vec<OrphanOutcome>,
    /// Files that could not be classified
    pub skipped: Vec<SkippedFile>,
    /// Archives treated as absent
    pub unreadable_archives: Vec<SkippedFile>,
    /// Base names with more than one archive
    pub ambiguous: Vec<AmbiguousGroup>,
    /// Processing stopped early on a shutdown request
    pub interrupted: bool,
}

impl FolderReport {
    /// Number of actions that failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.duplicates
            .iter()
            .map(|d| &d.outcome)
            .chain(self.orphans.iter().map(|o| &o.outcome))
            .filter(|o| matches!(o, Outcome::Failed { .. }))
            .count()
    }
}

/// Configuration for folder processing.
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfig {
    /// Perform deletions and compressions instead of only reporting.
    pub execute: bool,
    /// Detect orphans and (when executing) archive them.
    pub compress_orphans: bool,
    /// Classification settings.
    pub resolver: ResolverConfig,
    /// Compression method for new archives.
    pub compression: Compression,
    /// How files are removed.
    pub delete: DeleteConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl ProcessorConfig {
    /// Enable or disable execution.
    #[must_use]
    pub fn with_execute(mut self, execute: bool) -> Self {
        self.execute = execute;
        self
    }

    /// Enable or disable orphan compression.
    #[must_use]
    pub fn with_compress_orphans(mut self, compress: bool) -> Self {
        self.compress_orphans = compress;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

/// Processes one folder at a time.
#[derive(Debug)]
pub struct FolderProcessor {
    config: ProcessorConfig,
    resolver: PairingResolver,
    compressor: Compressor,
}

impl FolderProcessor {
    /// Create a processor from its configuration.
    #[must_use]
    pub fn new(config: ProcessorConfig) -> Self {
        let resolver = PairingResolver::new(config.resolver.clone());
        let compressor = Compressor::new(CompressOptions {
            compression: config.compression,
            paranoid: config.resolver.paranoid,
            checksummer: config.resolver.checksummer.clone(),
        });
        Self {
            config,
            resolver,
            compressor,
        }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.config
            .shutdown_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Classify, report, and (when executing) act on one folder.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] only if the folder itself cannot be listed.
    /// Per-file failures are recorded in the report instead.
    pub fn process(
        &self,
        folder: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<FolderReport, ScanError> {
        let scan = self.resolver.scan_folder(folder)?;
        reporter.folder_started(folder);

        let mut report = FolderReport {
            folder: folder.to_path_buf(),
            skipped: scan.skipped.clone(),
            unreadable_archives: scan.unreadable_archives.clone(),
            ambiguous: scan.ambiguous.clone(),
            ..FolderReport::default()
        };

        for record in &scan.duplicates {
            if self.is_shutdown_requested() {
                report.interrupted = true;
                break;
            }
            reporter.duplicate_found(record);
            let outcome = if self.config.execute {
                self.delete_duplicate(record)
            } else {
                Outcome::DryRun
            };
            reporter.outcome(&record.file.path, &outcome);
            report.duplicates.push(DuplicateOutcome {
                file: record.file.path.clone(),
                archive: record.archive.clone(),
                size: record.member.size,
                crc32: record.member.crc32,
                outcome,
            });
        }

        if self.config.compress_orphans && !report.interrupted {
            for record in &scan.orphans {
                if self.is_shutdown_requested() {
                    report.interrupted = true;
                    break;
                }
                reporter.orphan_found(record);
                let outcome = if self.config.execute {
                    self.compress_orphan(record)
                } else {
                    Outcome::DryRun
                };
                reporter.outcome(&record.file.path, &outcome);
                report.orphans.push(OrphanOutcome {
                    file: record.file.path.clone(),
                    archive: record.archive.clone(),
                    size: record.file.size,
                    outcome,
                });
            }
        }

        reporter.folder_finished(&report);
        Ok(report)
    }

    fn delete_duplicate(&self, record: &DuplicateRecord) -> Outcome {
        match self.resolver.reconfirm(record) {
            Ok(Some(_)) => match delete_file(&record.file.path, &self.config.delete) {
                Ok(_) => Outcome::Deleted,
                Err(e) => Outcome::Failed {
                    reason: e.to_string(),
                },
            },
            Ok(None) => {
                log::warn!(
                    "{} no longer matches {}; left in place",
                    record.file.path.display(),
                    record.archive.display()
                );
                Outcome::Skipped {
                    reason: "changed since scan".to_string(),
                }
            }
            Err(e) => Outcome::Failed {
                reason: e.to_string(),
            },
        }
    }

    fn compress_orphan(&self, record: &OrphanRecord) -> Outcome {
        let verified = match self
            .compressor
            .create(&record.file.path)
            .and_then(CreatedArchive::verify)
        {
            Ok(verified) => verified,
            Err(e) => {
                log::warn!("Not compressing {}: {}", record.file.path.display(), e);
                return Outcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match verified.commit(&self.config.delete) {
            Ok(_) => Outcome::Compressed,
            Err(e) => Outcome::Failed {
                reason: format!("archive verified but source not removed: {e}"),
            },
        }
    }
}
