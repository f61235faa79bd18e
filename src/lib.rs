//! zipsweep - reconcile loose files with same-named zip archives
//!
//! Walks a directory tree one folder at a time. In each folder a loose file
//! whose base name matches a zip archive is a *duplicate* when the archive
//! holds a member with the same name, size and CRC-32; duplicates can be
//! deleted. A loose file with no archive is an *orphan* and can be
//! compressed into one, with the original removed only after the new
//! archive verifies.
//!
//! Without `--execute` nothing on disk changes; the report is identical
//! either way apart from the outcome lines.

pub mod actions;
pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod pairing;
pub mod processor;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal};

use anyhow::Context;

use crate::actions::DeleteConfig;
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::{JsonReporter, Reporter, RunSummary, TextReporter};
use crate::pairing::ResolverConfig;
use crate::processor::{FolderProcessor, ProcessorConfig};
use crate::scanner::{validate_root, Checksummer, FolderWalker};

/// Run the application, writing the report to stdout.
///
/// # Errors
///
/// Returns an error only for fatal conditions: the root is missing or not
/// a directory, or the report cannot be written. Per-file failures are part
/// of the report and still yield [`ExitCode::Success`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let stdout = io::stdout();
    let color = !cli.no_color && stdout.is_terminal();
    match cli.output {
        OutputFormat::Text => run_with_reporter(&cli, &mut TextReporter::new(stdout.lock(), color)),
        OutputFormat::Json => run_with_reporter(&cli, &mut JsonReporter::new(stdout.lock(), true)),
    }
}

/// Run the application against an arbitrary reporter.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_with_reporter(cli: &Cli, reporter: &mut dyn Reporter) -> anyhow::Result<ExitCode> {
    validate_root(&cli.path).context("Cannot process root")?;

    let config = Config::load(cli.config.as_deref()).with_cli_overrides(cli);
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler()?;
    let processor = FolderProcessor::new(ProcessorConfig {
        execute: cli.execute,
        compress_orphans: cli.compress_orphans,
        resolver: ResolverConfig {
            checksummer: Checksummer::with_chunk_size(config.chunk_size),
            paranoid: config.paranoid,
        },
        compression: config.compression,
        delete: DeleteConfig {
            use_trash: config.use_trash,
        },
        shutdown_flag: Some(shutdown.get_flag()),
    });

    if !cli.execute {
        log::info!("Dry run: no files will be deleted or compressed (use --execute)");
    }

    let walker = FolderWalker::new(&cli.path).with_shutdown_flag(shutdown.get_flag());
    let mut summary = RunSummary::default();

    for folder in walker.folders() {
        let result = folder.and_then(|folder| processor.process(&folder, reporter));
        match result {
            Ok(report) => summary.record(&report),
            Err(e) => {
                log::warn!("Skipping folder: {}", e);
                summary.folder_errors += 1;
                reporter.folder_failed(e.path(), &e.to_string());
            }
        }
        if shutdown.is_shutdown_requested() {
            break;
        }
    }

    summary.interrupted |= shutdown.is_shutdown_requested();
    reporter.finish(&summary).context("Failed to write report")?;

    log::info!(
        "Processed {} folder(s): {} duplicate(s), {} orphan(s), {} failure(s)",
        summary.folders,
        summary.duplicates,
        summary.orphans,
        summary.failed
    );

    if summary.interrupted {
        log::warn!("Interrupted; remaining folders were not processed");
        Ok(ExitCode::Interrupted)
    } else {
        Ok(ExitCode::Success)
    }
}
