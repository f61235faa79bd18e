//! Base-name grouping of one folder's files.
//!
//! # Overview
//!
//! Pairing is scoped to a single folder and keyed on the base name only
//! (file name without its last extension). Each [`PairingGroup`] holds the
//! loose files and the zip archives sharing one base name.
//!
//! When a group holds more than one archive (`notes.zip` and `notes.ZIP`
//! on a case-sensitive filesystem), the archive checked is the
//! lexicographically smallest file name, so the choice does not depend on
//! directory listing order.
//!
//! # Example
//!
//! ```
//! use zipsweep::pairing::group_by_base_name;
//! use zipsweep::scanner::FileEntry;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/d/report.txt"), 10).unwrap(),
//!     FileEntry::new(PathBuf::from("/d/report.zip"), 120).unwrap(),
//!     FileEntry::new(PathBuf::from("/d/photo.jpg"), 2048).unwrap(),
//! ];
//!
//! let (groups, stats) = group_by_base_name(files);
//!
//! assert_eq!(groups.len(), 2);
//! assert_eq!(stats.archives, 1);
//! assert_eq!(stats.loose_files, 2);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::scanner::FileEntry;

/// Loose files and archives sharing a base name within one folder.
#[derive(Debug, Clone, Default)]
pub struct PairingGroup {
    /// Shared base name
    pub base_name: String,
    /// Zip archives, sorted by file name
    pub archives: Vec<FileEntry>,
    /// Non-archive files, sorted by file name
    pub loose: Vec<FileEntry>,
}

impl PairingGroup {
    /// Create an empty group for a base name.
    #[must_use]
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            ..Self::default()
        }
    }

    /// Add a file to the archive or loose side of the group.
    pub fn add(&mut self, file: FileEntry) {
        debug_assert_eq!(file.base_name(), self.base_name);
        if file.is_archive() {
            self.archives.push(file);
        } else {
            self.loose.push(file);
        }
    }

    /// The archive loose files are checked against, if any.
    #[must_use]
    pub fn selected_archive(&self) -> Option<&FileEntry> {
        self.archives.iter().min_by(|a, b| a.file_name.cmp(&b.file_name))
    }

    /// Whether more than one archive shares this base name.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.archives.len() > 1
    }

    /// Whether the group has both an archive and at least one loose file.
    #[must_use]
    pub fn is_paired(&self) -> bool {
        !self.archives.is_empty() && !self.loose.is_empty()
    }
}

/// Counts gathered while grouping a folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Regular files in the folder
    pub total_files: usize,
    /// Files with a zip extension
    pub archives: usize,
    /// Files without a zip extension
    pub loose_files: usize,
    /// Groups with both an archive and a loose file
    pub paired_groups: usize,
    /// Groups with more than one archive
    pub ambiguous_groups: usize,
}

/// Partition a folder listing into groups by base name.
///
/// Groups are returned in base-name order, and the files inside each group
/// in file-name order.
#[must_use]
pub fn group_by_base_name(files: Vec<FileEntry>) -> (Vec<PairingGroup>, GroupingStats) {
    let mut stats = GroupingStats {
        total_files: files.len(),
        ..GroupingStats::default()
    };
    let mut by_base: BTreeMap<String, PairingGroup> = BTreeMap::new();

    for file in files {
        if file.is_archive() {
            stats.archives += 1;
        } else {
            stats.loose_files += 1;
        }
        by_base
            .entry(file.base_name().to_string())
            .or_insert_with_key(|base| PairingGroup::new(base.clone()))
            .add(file);
    }

    let groups: Vec<PairingGroup> = by_base
        .into_values()
        .map(|mut group| {
            group.archives.sort_by(|a, b| a.file_name.cmp(&b.file_name));
            group.loose.sort_by(|a, b| a.file_name.cmp(&b.file_name));
            group
        })
        .collect();

    stats.paired_groups = groups.iter().filter(|g| g.is_paired()).count();
    stats.ambiguous_groups = groups.iter().filter(|g| g.is_ambiguous()).count();

    log::trace!(
        "Grouped {} files into {} base names ({} paired)",
        stats.total_files,
        groups.len(),
        stats.paired_groups
    );

    (groups, stats)
}
