//! Streaming CRC-32 checksum engine.
//!
//! # Overview
//!
//! This module provides the [`Checksummer`] for computing the CRC-32 of a
//! file's contents with bounded memory. The file is read in fixed-size
//! chunks (64 KiB by default) and fed to [`crc32fast::Hasher`], which
//! implements the same IEEE polynomial the zip format stores per member.
//! A value computed here is therefore directly comparable to the CRC field
//! of an archive member.
//!
//! No partial value is ever returned: an open failure or a read failure in
//! the middle of the stream yields a [`ChecksumError`].
//!
//! # Example
//!
//! ```no_run
//! use zipsweep::scanner::Checksummer;
//! use std::path::Path;
//!
//! let checksummer = Checksummer::new();
//! let sum = checksummer.checksum(Path::new("notes.txt")).unwrap();
//! println!("crc32={:08x} size={}", sum.crc32, sum.size);
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Default read size for streaming checksums (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest accepted read size (64 MiB).
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// CRC-32 and byte count of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileChecksum {
    /// CRC-32 (IEEE) of the full contents.
    pub crc32: u32,
    /// Number of bytes consumed.
    pub size: u64,
}

/// Errors that can occur while computing a checksum.
#[derive(thiserror::Error, Debug)]
pub enum ChecksumError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ChecksumError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Streaming CRC-32 calculator with a fixed read buffer size.
#[derive(Debug, Clone)]
pub struct Checksummer {
    chunk_size: usize,
}

impl Default for Checksummer {
    fn default() -> Self {
        Self::new()
    }
}

impl Checksummer {
    /// Create a checksummer reading [`DEFAULT_CHUNK_SIZE`] bytes at a time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Create a checksummer with a custom chunk size, clamped to
    /// `1..=MAX_CHUNK_SIZE`.
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.clamp(1, MAX_CHUNK_SIZE),
        }
    }

    /// The configured read size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compute the CRC-32 of a file.
    ///
    /// The file handle is opened and released within this call.
    ///
    /// # Errors
    ///
    /// Returns [`ChecksumError`] if the file cannot be opened or a read fails.
    pub fn checksum(&self, path: &Path) -> Result<FileChecksum, ChecksumError> {
        let file = File::open(path).map_err(|e| ChecksumError::from_io(path, e))?;
        let sum = self
            .checksum_reader(file)
            .map_err(|e| ChecksumError::from_io(path, e))?;
        log::trace!(
            "crc32 {:08x} ({} bytes): {}",
            sum.crc32,
            sum.size,
            path.display()
        );
        Ok(sum)
    }

    /// Compute the CRC-32 of everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates the first read error other than `Interrupted`.
    pub fn checksum_reader<R: Read>(&self, mut reader: R) -> io::Result<FileChecksum> {
        let mut hasher = crc32fast::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];
        let mut size = 0u64;

        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..read]);
            size += read as u64;
        }

        Ok(FileChecksum {
            crc32: hasher.finalize(),
            size,
        })
    }
}
