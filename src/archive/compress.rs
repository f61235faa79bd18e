//! Compress-and-verify for orphan files.
//!
//! # Overview
//!
//! Turning an orphan into an archive is a three step sequence, expressed as
//! a typestate so the source can only be deleted after verification:
//!
//! ```text
//! create ──> CreatedArchive ──verify──> VerifiedArchive ──commit──> source gone
//!                          └─(mismatch / unreadable)──> archive removed
//! ```
//!
//! 1. [`Compressor::create`] writes `<path with extension replaced by zip>`
//!    holding one member named after the source file. The archive is opened
//!    with `create_new`, so an existing entry is never overwritten. A failed
//!    write removes the partial archive.
//! 2. [`CreatedArchive::verify`] re-opens the archive, reads the member's
//!    stored size and CRC-32, recomputes the source checksum and requires
//!    both to match. In paranoid mode the member is also decompressed and its
//!    content CRC compared. Any failure deletes the new archive and leaves
//!    the source untouched.
//! 3. [`VerifiedArchive::commit`] deletes the source.
//!
//! # Example
//!
//! ```no_run
//! use zipsweep::actions::DeleteConfig;
//! use zipsweep::archive::{CompressOptions, Compressor};
//! use std::path::Path;
//!
//! let compressor = Compressor::new(CompressOptions::default());
//! let created = compressor.create(Path::new("report.txt")).unwrap();
//! match created.verify() {
//!     Ok(verified) => {
//!         verified.commit(&DeleteConfig::default()).unwrap();
//!     }
//!     Err(e) => eprintln!("rolled back: {}", e),
//! }
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::inspect::ArchiveReader;
use super::{ArchiveError, Compression};
use crate::actions::{delete_file, DeleteConfig, DeleteError, DeleteResult};
use crate::scanner::{ChecksumError, Checksummer, FileChecksum, ARCHIVE_EXTENSION};

/// Errors that can occur while compressing and verifying an orphan.
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    /// The source path has no UTF-8 file name to use as the member name.
    #[error("cannot derive a member name from {0}")]
    InvalidName(PathBuf),

    /// Something already exists at the target archive path.
    #[error("archive already exists: {0}")]
    ArchiveExists(PathBuf),

    /// The source could not be opened for reading.
    #[error("cannot read source {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the archive failed; the partial archive was removed.
    #[error("failed to write archive {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    /// The written archive could not be re-opened or its member read.
    #[error("verification failed: {0}")]
    Inspect(#[from] ArchiveError),

    /// The written archive does not contain the expected member.
    #[error("verification failed: member '{name}' missing from {archive}")]
    MemberMissing { archive: PathBuf, name: String },

    /// The source could not be checksummed during verification.
    #[error("verification failed: {0}")]
    Checksum(#[from] ChecksumError),

    /// Stored size or CRC-32 differ from the source.
    #[error(
        "verification failed for {archive}: stored {stored_size} bytes crc {stored_crc:08x}, \
         source {source_size} bytes crc {source_crc:08x}"
    )]
    Mismatch {
        archive: PathBuf,
        stored_size: u64,
        stored_crc: u32,
        source_size: u64,
        source_crc: u32,
    },
}

/// Options for creating and verifying archives.
#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    /// Compression method for the new member.
    pub compression: Compression,
    /// Also decompress the member and compare its content CRC-32.
    pub paranoid: bool,
    /// Checksum engine used for the source file.
    pub checksummer: Checksummer,
}

/// Writes single-member archives for orphan files.
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    options: CompressOptions,
}

impl Compressor {
    /// Create a compressor with the given options.
    #[must_use]
    pub fn new(options: CompressOptions) -> Self {
        Self { options }
    }

    /// Write a new archive next to `source` containing exactly that file.
    ///
    /// # Errors
    ///
    /// Fails without leaving an archive behind if the target already exists,
    /// the source cannot be read, or writing fails.
    pub fn create(&self, source: &Path) -> Result<CreatedArchive, CompressError> {
        let member_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CompressError::InvalidName(source.to_path_buf()))?
            .to_string();
        let archive = source.with_extension(ARCHIVE_EXTENSION);

        let mut input = File::open(source).map_err(|e| CompressError::SourceRead {
            path: source.to_path_buf(),
            source: e,
        })?;
        let size = input
            .metadata()
            .map_err(|e| CompressError::SourceRead {
                path: source.to_path_buf(),
                source: e,
            })?
            .len();

        let output = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&archive)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => CompressError::ArchiveExists(archive.clone()),
                _ => CompressError::Write {
                    path: archive.clone(),
                    reason: e.to_string(),
                },
            })?;

        let options = SimpleFileOptions::default()
            .compression_method(self.options.compression.as_zip_method())
            .large_file(size >= u64::from(u32::MAX));

        let written = (|| -> Result<(), String> {
            let mut writer = ZipWriter::new(BufWriter::new(output));
            writer
                .start_file(member_name.as_str(), options)
                .map_err(|e| e.to_string())?;
            io::copy(&mut input, &mut writer).map_err(|e| e.to_string())?;
            let mut inner = writer.finish().map_err(|e| e.to_string())?;
            io::Write::flush(&mut inner).map_err(|e| e.to_string())?;
            Ok(())
        })();

        if let Err(reason) = written {
            remove_archive(&archive);
            return Err(CompressError::Write {
                path: archive,
                reason,
            });
        }

        log::debug!(
            "Created {} ({}) from {}",
            archive.display(),
            self.options.compression,
            source.display()
        );

        Ok(CreatedArchive {
            source: source.to_path_buf(),
            archive,
            member_name,
            options: self.options.clone(),
        })
    }

    /// Create and verify in one step.
    ///
    /// # Errors
    ///
    /// See [`Compressor::create`] and [`CreatedArchive::verify`].
    pub fn compress(&self, source: &Path) -> Result<VerifiedArchive, CompressError> {
        self.create(source)?.verify()
    }
}

/// An archive that has been written but not yet proven to match its source.
#[derive(Debug)]
#[must_use = "an unverified archive must be verified or it stays on disk unchecked"]
pub struct CreatedArchive {
    source: PathBuf,
    archive: PathBuf,
    member_name: String,
    options: CompressOptions,
}

impl CreatedArchive {
    /// Path of the written archive.
    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive
    }

    /// Path of the source file.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source
    }

    /// Re-open the archive and prove its member reproduces the source.
    ///
    /// On any failure the archive is deleted and the source left in place.
    ///
    /// # Errors
    ///
    /// Returns the reason verification failed after rolling back.
    pub fn verify(self) -> Result<VerifiedArchive, CompressError> {
        match self.check() {
            Ok(checksum) => {
                log::debug!("Verified {}", self.archive.display());
                Ok(VerifiedArchive {
                    source: self.source,
                    archive: self.archive,
                    checksum,
                })
            }
            Err(e) => {
                log::warn!("Rolling back {}: {}", self.archive.display(), e);
                remove_archive(&self.archive);
                Err(e)
            }
        }
    }

    fn check(&self) -> Result<FileChecksum, CompressError> {
        let mut reader = ArchiveReader::open(&self.archive)?;
        let member = reader
            .member(&self.member_name)?
            .ok_or_else(|| CompressError::MemberMissing {
                archive: self.archive.clone(),
                name: self.member_name.clone(),
            })?;

        let source = self.options.checksummer.checksum(&self.source)?;
        if member.size != source.size || member.crc32 != source.crc32 {
            return Err(CompressError::Mismatch {
                archive: self.archive.clone(),
                stored_size: member.size,
                stored_crc: member.crc32,
                source_size: source.size,
                source_crc: source.crc32,
            });
        }

        if self.options.paranoid {
            let content = reader
                .content_checksum(&self.member_name, &self.options.checksummer)?
                .ok_or_else(|| CompressError::MemberMissing {
                    archive: self.archive.clone(),
                    name: self.member_name.clone(),
                })?;
            if content != source {
                return Err(CompressError::Mismatch {
                    archive: self.archive.clone(),
                    stored_size: content.size,
                    stored_crc: content.crc32,
                    source_size: source.size,
                    source_crc: source.crc32,
                });
            }
        }

        Ok(source)
    }
}

/// An archive proven to hold an exact copy of its source.
#[derive(Debug)]
#[must_use = "a verified archive does nothing until committed"]
pub struct VerifiedArchive {
    source: PathBuf,
    archive: PathBuf,
    checksum: FileChecksum,
}

impl VerifiedArchive {
    /// Path of the verified archive.
    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive
    }

    /// Checksum shared by the source and the archive member.
    #[must_use]
    pub fn checksum(&self) -> FileChecksum {
        self.checksum
    }

    /// Delete the source; the archive becomes its only copy.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteError`] if the source cannot be removed. The archive
    /// is kept either way, since it is a verified copy.
    pub fn commit(self, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
        delete_file(&self.source, config)
    }
}

fn remove_archive(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            log::error!("Failed to remove archive {}: {}", path.display(), e);
        }
    }
}
