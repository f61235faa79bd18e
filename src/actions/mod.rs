//! File actions module.
//!
//! This module provides the deletion primitive shared by duplicate removal
//! and orphan commit:
//! - Permanent deletion (default)
//! - Move to system trash via the trash crate (`--trash`)
//!
//! ```no_run
//! use zipsweep::actions::{delete_file, DeleteConfig};
//! use std::path::Path;
//!
//! let result = delete_file(Path::new("/path/to/duplicate.txt"), &DeleteConfig::trash());
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_file, delete_to_trash, permanent_delete, DeleteConfig, DeleteError, DeleteResult,
};
