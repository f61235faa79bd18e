//! Pairing of loose files with same-named archives.
//!
//! This module provides functionality for:
//! - Base-name grouping of one folder's files
//! - Classification into verified duplicates and orphans
//!
//! Grouping never crosses folders; each folder is classified on its own.

pub mod groups;
pub mod resolver;

pub use groups::{group_by_base_name, GroupingStats, PairingGroup};
pub use resolver::{
    AmbiguousGroup, DuplicateRecord, FolderScan, MatchError, OrphanRecord, PairingResolver,
    ResolverConfig, SkippedFile,
};
