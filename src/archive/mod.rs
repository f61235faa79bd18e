//! Zip archive inspection and creation.
//!
//! This module provides functionality for:
//! - Looking up a named member's stored size and CRC-32 without extracting it
//! - Optionally decompressing a member to recompute its CRC-32 (paranoid mode)
//! - Creating a single-member archive and proving it reproduces its source
//!   before the source may be removed
//!
//! # Architecture
//!
//! - [`inspect`]: read-only access to existing archives
//! - [`compress`]: the create, verify, commit/rollback sequence for orphans

pub mod compress;
pub mod inspect;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use compress::{CompressError, CompressOptions, Compressor, CreatedArchive, VerifiedArchive};
pub use inspect::{inspect_member, ArchiveReader};

/// Stored metadata for one archive member, read from the central directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    /// Member name as stored in the archive
    pub name: String,
    /// Declared uncompressed size in bytes
    pub size: u64,
    /// CRC-32 recorded when the archive was written
    pub crc32: u32,
}

/// Compression method used for newly written archives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// DEFLATE, readable by every zip tool
    #[default]
    Deflated,
    /// No compression
    Stored,
}

impl Compression {
    pub(crate) fn as_zip_method(self) -> zip::CompressionMethod {
        match self {
            Self::Deflated => zip::CompressionMethod::Deflated,
            Self::Stored => zip::CompressionMethod::Stored,
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deflated => write!(f, "deflated"),
            Self::Stored => write!(f, "stored"),
        }
    }
}

/// Errors that can occur while reading an archive.
#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    /// The archive could not be opened or is not a valid zip container.
    #[error("archive unreadable: {path}: {reason}")]
    Unreadable {
        /// Archive path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// The member exists but its header or data could not be read.
    #[error("cannot read member '{name}' in {path}: {reason}")]
    Member {
        /// Archive path
        path: PathBuf,
        /// Member name
        name: String,
        /// Underlying failure
        reason: String,
    },
}

impl ArchiveError {
    /// Path of the archive this error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Unreadable { path, .. } | Self::Member { path, .. } => path,
        }
    }
}
