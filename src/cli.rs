//! Command-line interface definitions for zipsweep.
//!
//! This module defines all CLI arguments and options using the clap derive API.
//! Without `--execute` the run only reports; nothing on disk changes.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under the current directory
//! zipsweep
//!
//! # Delete duplicates and archive orphans
//! zipsweep ~/Downloads --execute --compress-orphans
//!
//! # JSON report with stored (uncompressed) archives and full content checks
//! zipsweep ~/Downloads -c --compression stored --paranoid --output json
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::archive::Compression;
use crate::scanner::MAX_CHUNK_SIZE;

/// Remove loose files already stored in a same-named zip archive.
///
/// zipsweep walks a directory tree and, folder by folder, pairs each loose
/// file with the zip archive sharing its base name. A loose file is a
/// duplicate when the archive holds a member with the same name, size and
/// CRC-32. Optionally, loose files with no archive are compressed into one.
#[derive(Debug, Parser)]
#[command(name = "zipsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory to process
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Delete duplicates and compress orphans instead of only reporting
    #[arg(short, long)]
    pub execute: bool,

    /// Report orphans and (with --execute) compress them into archives
    #[arg(short, long)]
    pub compress_orphans: bool,

    /// Also decompress archive members and compare their content checksum
    ///
    /// Slower, but catches archives whose headers do not match their data.
    #[arg(long)]
    pub paranoid: bool,

    /// Move files to the system trash instead of deleting them permanently
    #[arg(long)]
    pub trash: bool,

    /// Compression method for new archives
    #[arg(long, value_enum, value_name = "METHOD")]
    pub compression: Option<Compression>,

    /// Read buffer size used for checksums (e.g., 64KiB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_chunk_size)]
    pub chunk_size: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse `--chunk-size`: a [`parse_size`] value no larger than
/// [`MAX_CHUNK_SIZE`].
///
/// # Errors
///
/// Returns an error for anything [`parse_size`] rejects or a size above the
/// limit.
pub fn parse_chunk_size(s: &str) -> Result<u64, String> {
    let bytes = parse_size(s)?;
    if bytes > MAX_CHUNK_SIZE as u64 {
        return Err(format!(
            "Chunk size must be at most {} bytes (64MiB)",
            MAX_CHUNK_SIZE
        ));
    }
    Ok(bytes)
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use zipsweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("64KiB").unwrap(), 65_536);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// an unknown size suffix, or evaluates to zero.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    let bytes = (num * multiplier as f64) as u64;
    if bytes == 0 {
        return Err("Size must be at least one byte".to_string());
    }
    Ok(bytes)
}
