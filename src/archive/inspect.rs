//! Read-only archive member lookup.
//!
//! # Overview
//!
//! [`ArchiveReader`] opens a zip container once and answers member queries
//! from its central directory. A lookup never decompresses member data;
//! the stored CRC-32 is trusted as a declared value and compared by the
//! caller against an independently computed checksum of the loose file.
//!
//! [`ArchiveReader::content_checksum`] is the exception: it decompresses a
//! member and recomputes its CRC-32, for callers that want proof beyond the
//! header (paranoid mode).
//!
//! A missing member is `Ok(None)`, a normal outcome. A corrupt or non-zip
//! container is [`ArchiveError::Unreadable`].

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use super::{ArchiveError, MemberInfo};
use crate::scanner::{Checksummer, FileChecksum};

/// An open zip archive. The file handle is released on drop.
pub struct ArchiveReader {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
}

impl std::fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("path", &self.path)
            .field("members", &self.archive.len())
            .finish()
    }
}

impl ArchiveReader {
    /// Open an archive and parse its central directory.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Unreadable`] if the file cannot be opened or
    /// is not a valid zip container.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let unreadable = |reason: String| ArchiveError::Unreadable {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
        let archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| unreadable(e.to_string()))?;
        log::trace!("Opened archive {} ({} members)", path.display(), archive.len());
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    /// Path of the open archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of members in the archive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Whether the archive has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Look up a member by exact name and return its stored size and CRC-32.
    ///
    /// Only header fields are read, so encrypted members are found without
    /// a password.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Member`] if the member's header is corrupt.
    pub fn member(&mut self, name: &str) -> Result<Option<MemberInfo>, ArchiveError> {
        let Some(index) = self.archive.index_for_name(name) else {
            return Ok(None);
        };
        match self.archive.by_index_raw(index) {
            Ok(file) => Ok(Some(MemberInfo {
                name: file.name().to_string(),
                size: file.size(),
                crc32: file.crc32(),
            })),
            Err(ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(member_error(&self.path, name, e.to_string())),
        }
    }

    /// Decompress a member and recompute its CRC-32 from the data stream.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Member`] if the member cannot be decompressed,
    /// including when the zip reader detects that the data does not match the
    /// stored CRC.
    pub fn content_checksum(
        &mut self,
        name: &str,
        checksummer: &Checksummer,
    ) -> Result<Option<FileChecksum>, ArchiveError> {
        let file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(member_error(&self.path, name, e.to_string())),
        };
        match checksummer.checksum_reader(file) {
            Ok(sum) => Ok(Some(sum)),
            Err(e) => Err(member_error(&self.path, name, e.to_string())),
        }
    }
}

fn member_error(path: &Path, name: &str, reason: String) -> ArchiveError {
    ArchiveError::Member {
        path: path.to_path_buf(),
        name: name.to_string(),
        reason,
    }
}

/// Open `archive` and look up `name` in one call.
///
/// # Errors
///
/// See [`ArchiveReader::open`] and [`ArchiveReader::member`].
pub fn inspect_member(archive: &Path, name: &str) -> Result<Option<MemberInfo>, ArchiveError> {
    ArchiveReader::open(archive)?.member(name)
}
