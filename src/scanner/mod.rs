//! Scanner module for folder listing and file checksums.
//!
//! This module provides functionality for:
//! - Walking a directory tree one folder at a time using walkdir
//! - Listing the regular files of a single folder
//! - Streaming CRC-32 checksums
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Folder traversal and single-folder listing
//! - [`checksum`]: CRC-32 file checksums (streaming)
//!
//! # Example
//!
//! ```no_run
//! use zipsweep::scanner::{list_folder, FolderWalker};
//! use std::path::Path;
//!
//! for folder in FolderWalker::new(Path::new(".")).folders() {
//!     let folder = folder.unwrap();
//!     for file in list_folder(&folder).unwrap() {
//!         println!("{} ({} bytes)", file.file_name, file.size);
//!     }
//! }
//! ```

pub mod checksum;
pub mod walker;

use std::path::{Path, PathBuf};

// Re-export main types
pub use checksum::{
    ChecksumError, Checksummer, FileChecksum, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE,
};
pub use walker::{list_folder, validate_root, FolderWalker};

/// Extension (compared ASCII case-insensitively) that marks a zip archive.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// A regular file found in a folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path to the file
    pub path: PathBuf,
    /// File name including extension
    pub file_name: String,
    /// File size in bytes at listing time
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    ///
    /// Returns `None` when the path has no UTF-8 file name, since such a
    /// name cannot be matched against a zip member name.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        Some(Self {
            path,
            file_name,
            size,
        })
    }

    /// The grouping key: file name with its last extension removed.
    #[must_use]
    pub fn base_name(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }

    /// Whether this file is a zip archive (by extension).
    #[must_use]
    pub fn is_archive(&self) -> bool {
        is_archive_path(&self.path)
    }

    /// Path of the archive that would hold this file: extension replaced by `zip`.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.path.with_extension(ARCHIVE_EXTENSION)
    }
}

/// Whether `path` has a `zip` extension (ASCII case-insensitive).
#[must_use]
pub fn is_archive_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub(crate) fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(path) | Self::NotFound(path) | Self::NotADirectory(path) => {
                path
            }
            Self::Io { path, .. } => path,
        }
    }
}
