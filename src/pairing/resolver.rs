//! Classification of one folder into duplicates and orphans.
//!
//! # Overview
//!
//! [`PairingResolver::classify`] is a pure function of the folder's current
//! contents: it reads files and archives but never mutates anything. Its
//! result, a [`FolderScan`], drives both reporting and (when executing) the
//! mutations performed by the folder processor.
//!
//! Per group:
//!
//! - **archive and loose files**: each loose file is looked up by its exact
//!   file name inside the selected archive. A member whose stored size and
//!   CRC-32 equal the file's current size and checksum makes the file a
//!   [`DuplicateRecord`]. A mismatch or a missing member leaves the file
//!   alone; a same-named archive suppresses orphan status even without a
//!   matching member.
//! - **no usable archive**: each loose file is an [`OrphanRecord`] unless
//!   something already exists at its target archive path.
//!
//! An unreadable archive is treated as absent; an unreadable loose file is
//! skipped. Neither stops the rest of the folder.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::groups::{group_by_base_name, GroupingStats, PairingGroup};
use crate::archive::{ArchiveError, ArchiveReader, MemberInfo};
use crate::scanner::{
    list_folder, ChecksumError, Checksummer, FileChecksum, FileEntry, ScanError,
};

/// A loose file proven identical to a member of its sibling archive.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateRecord {
    /// The loose file
    #[serde(serialize_with = "serialize_entry_path")]
    pub file: FileEntry,
    /// The archive holding the identical member
    pub archive: PathBuf,
    /// Stored metadata of the matching member
    pub member: MemberInfo,
}

impl DuplicateRecord {
    /// File name of the archive, for display.
    #[must_use]
    pub fn archive_name(&self) -> String {
        self.archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A loose file with no archive at its base name.
#[derive(Debug, Clone, Serialize)]
pub struct OrphanRecord {
    /// The loose file
    #[serde(serialize_with = "serialize_entry_path")]
    pub file: FileEntry,
    /// Where its archive would be written
    pub archive: PathBuf,
}

/// A file left out of classification, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    /// Path of the skipped file or archive
    pub path: PathBuf,
    /// Why it was skipped
    pub reason: String,
}

/// A base name shared by more than one archive.
#[derive(Debug, Clone, Serialize)]
pub struct AmbiguousGroup {
    /// Shared base name
    pub base_name: String,
    /// Every archive with this base name
    pub archives: Vec<PathBuf>,
    /// The archive that was checked
    pub selected: PathBuf,
}

/// Classification result for one folder.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderScan {
    /// Folder that was classified
    pub folder: PathBuf,
    /// Verified duplicates
    pub duplicates: Vec<DuplicateRecord>,
    /// Orphan candidates
    pub orphans: Vec<OrphanRecord>,
    /// Loose files whose checksum or member lookup failed
    pub skipped: Vec<SkippedFile>,
    /// Archives that could not be opened (treated as absent)
    pub unreadable_archives: Vec<SkippedFile>,
    /// Base names with more than one archive
    pub ambiguous: Vec<AmbiguousGroup>,
    /// Grouping counts
    pub stats: GroupingStats,
}

/// Why a loose file could not be matched against a member.
#[derive(thiserror::Error, Debug)]
pub enum MatchError {
    /// The archive or its member header could not be read.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The loose file could not be checksummed.
    #[error(transparent)]
    Checksum(#[from] ChecksumError),
}

/// Configuration for the pairing resolver.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Checksum engine for loose files and member data.
    pub checksummer: Checksummer,
    /// Also decompress matching members and compare their content CRC-32.
    pub paranoid: bool,
}

/// Classifies folders into duplicates and orphans.
#[derive(Debug, Clone, Default)]
pub struct PairingResolver {
    config: ResolverConfig,
}

impl PairingResolver {
    /// Create a resolver with the given configuration.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// List `folder` and classify its files.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the folder cannot be listed.
    pub fn scan_folder(&self, folder: &Path) -> Result<FolderScan, ScanError> {
        let files = list_folder(folder)?;
        Ok(self.classify(folder, files))
    }

    /// Classify one folder's listing. Reads files, never modifies them.
    #[must_use]
    pub fn classify(&self, folder: &Path, files: Vec<FileEntry>) -> FolderScan {
        let (groups, stats) = group_by_base_name(files);
        let mut scan = FolderScan {
            folder: folder.to_path_buf(),
            stats,
            ..FolderScan::default()
        };

        for group in &groups {
            if group.loose.is_empty() {
                continue;
            }
            match self.open_selected_archive(group, &mut scan) {
                Some(reader) => self.find_duplicates(group, reader, &mut scan),
                None => find_orphans(group, &mut scan),
            }
        }

        log::debug!(
            "{}: {} duplicate(s), {} orphan(s), {} skipped",
            folder.display(),
            scan.duplicates.len(),
            scan.orphans.len(),
            scan.skipped.len() + scan.unreadable_archives.len()
        );
        scan
    }

    /// Re-check a duplicate against the live filesystem.
    ///
    /// Returns the fresh record if the file still matches its member, or
    /// `None` if it no longer does.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] if the archive or the file cannot be read.
    pub fn reconfirm(
        &self,
        record: &DuplicateRecord,
    ) -> Result<Option<DuplicateRecord>, MatchError> {
        let mut reader = ArchiveReader::open(&record.archive)?;
        let member = self.match_member(&mut reader, &record.file)?;
        Ok(member.map(|member| DuplicateRecord {
            file: record.file.clone(),
            archive: record.archive.clone(),
            member,
        }))
    }

    fn open_selected_archive(
        &self,
        group: &PairingGroup,
        scan: &mut FolderScan,
    ) -> Option<ArchiveReader> {
        let selected = group.selected_archive()?;

        if group.is_ambiguous() {
            log::warn!(
                "{} archives share base name '{}' in {}; checking {} only",
                group.archives.len(),
                group.base_name,
                scan.folder.display(),
                selected.file_name
            );
            scan.ambiguous.push(AmbiguousGroup {
                base_name: group.base_name.clone(),
                archives: group.archives.iter().map(|a| a.path.clone()).collect(),
                selected: selected.path.clone(),
            });
        }

        match ArchiveReader::open(&selected.path) {
            Ok(reader) => Some(reader),
            Err(e) => {
                log::warn!("Treating archive as absent: {}", e);
                scan.unreadable_archives.push(SkippedFile {
                    path: selected.path.clone(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn find_duplicates(
        &self,
        group: &PairingGroup,
        mut reader: ArchiveReader,
        scan: &mut FolderScan,
    ) {
        for file in &group.loose {
            match self.match_member(&mut reader, file) {
                Ok(Some(member)) => {
                    log::debug!(
                        "Duplicate: {} matches {}:{}",
                        file.path.display(),
                        reader.path().display(),
                        member.name
                    );
                    scan.duplicates.push(DuplicateRecord {
                        file: file.clone(),
                        archive: reader.path().to_path_buf(),
                        member,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Skipping {}: {}", file.path.display(), e);
                    scan.skipped.push(SkippedFile {
                        path: file.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Look up `file` in the archive and return the member if it is an exact copy.
    fn match_member(
        &self,
        reader: &mut ArchiveReader,
        file: &FileEntry,
    ) -> Result<Option<MemberInfo>, MatchError> {
        let Some(member) = reader.member(&file.file_name)? else {
            log::trace!("{} has no member {}", reader.path().display(), file.file_name);
            return Ok(None);
        };

        let current: FileChecksum = self.config.checksummer.checksum(&file.path)?;
        if member.size != current.size || member.crc32 != current.crc32 {
            log::trace!(
                "{} differs from member (size {} vs {}, crc {:08x} vs {:08x})",
                file.path.display(),
                current.size,
                member.size,
                current.crc32,
                member.crc32
            );
            return Ok(None);
        }

        if self.config.paranoid {
            let content = reader.content_checksum(&member.name, &self.config.checksummer)?;
            if content != Some(current) {
                log::warn!(
                    "Member {} in {} has a matching header but different content",
                    member.name,
                    reader.path().display()
                );
                return Ok(None);
            }
        }

        Ok(Some(member))
    }
}

fn find_orphans(group: &PairingGroup, scan: &mut FolderScan) {
    for file in &group.loose {
        let archive = file.archive_path();
        // Any entry at the target path (file, directory, dangling link) blocks compression
        if fs::symlink_metadata(&archive).is_ok() {
            log::debug!(
                "Not an orphan, {} already exists: {}",
                archive.display(),
                file.path.display()
            );
            continue;
        }
        scan.orphans.push(OrphanRecord {
            file: file.clone(),
            archive,
        });
    }
}

fn serialize_entry_path<S: serde::Serializer>(file: &FileEntry, s: S) -> Result<S::Ok, S::Error> {
    serde::Serialize::serialize(&file.path, s)
}
