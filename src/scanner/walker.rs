//! Folder walker and single-folder listing.
//!
//! # Overview
//!
//! The reconciliation core works on exactly one folder at a time. This
//! module supplies the two thin filesystem wrappers around it:
//!
//! - [`FolderWalker`] visits every directory under a root exactly once
//!   (root included), using [`walkdir`] with name-sorted, deterministic
//!   order and no symlink following.
//! - [`list_folder`] returns the regular files directly inside one folder,
//!   sorted by file name.
//!
//! # Example
//!
//! ```no_run
//! use zipsweep::scanner::FolderWalker;
//! use std::path::Path;
//!
//! let walker = FolderWalker::new(Path::new("/data/backups"));
//! for folder in walker.folders() {
//!     match folder {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{FileEntry, ScanError};

/// Check that the scan root exists and is a directory.
///
/// # Errors
///
/// - `NotFound` if the path does not exist
/// - `NotADirectory` if it exists but is not a directory
pub fn validate_root(root: &Path) -> Result<(), ScanError> {
    let metadata = fs::metadata(root).map_err(|e| ScanError::from_io(root, e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Walks a directory tree yielding each folder once.
#[derive(Debug)]
pub struct FolderWalker {
    /// Root path to walk
    root: PathBuf,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl FolderWalker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag; iteration stops once it is raised.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Iterate over the root and all of its subdirectories, parents first.
    ///
    /// Unreadable directories are yielded as errors rather than stopping
    /// iteration.
    pub fn folders(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    return false;
                }
                true
            })
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_dir() => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    log::debug!("Cannot read {}: {}", path.display(), e);
                    Some(Err(match e.into_io_error() {
                        Some(io) => ScanError::from_io(&path, io),
                        None => ScanError::Io {
                            path: path.clone(),
                            source: std::io::Error::other("filesystem loop detected"),
                        },
                    }))
                }
            })
    }
}

/// List the regular files directly inside `folder`, sorted by file name.
///
/// Symlinks are followed when deciding whether an entry is a regular file.
/// Entries whose metadata cannot be read, and files whose names are not
/// valid UTF-8, are skipped with a log message.
///
/// # Errors
///
/// Returns [`ScanError`] if the folder itself cannot be read.
pub fn list_folder(folder: &Path) -> Result<Vec<FileEntry>, ScanError> {
    let reader = fs::read_dir(folder).map_err(|e| ScanError::from_io(folder, e))?;
    let mut files = Vec::new();

    for entry in reader {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Error reading entry in {}: {}", folder.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        match FileEntry::new(path, metadata.len()) {
            Some(file) => files.push(file),
            None => log::warn!(
                "Skipping file with non UTF-8 name: {}",
                entry.path().display()
            ),
        }
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}
