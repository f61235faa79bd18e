use super::fixtures::run;
use clap::Parser;
use std::fs;
use tempfile::tempdir;
use zipsweep::cli::{Cli, OutputFormat};
use zipsweep::error::{ExitCode, StructuredError};

#[test]
fn test_default_path_is_current_directory() {
    let cli = Cli::try_parse_from(["zipsweep", "-c"]).unwrap();
    assert_eq!(cli.path, std::path::PathBuf::from("."));
    assert!(cli.compress_orphans);
    assert!(!cli.execute);
}

#[test]
fn test_per_file_failures_still_exit_success() {
    let dir = tempdir().unwrap();
    // A file named like the archive target but not a zip: the loose file is
    // neither a duplicate nor an orphan, and nothing fails fatally.
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("a.zip"), "garbage").unwrap();

    let (code, _) = run(&[dir.path().to_str().unwrap(), "-e", "-c"]);
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_fatal_error_as_structured_json() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "zipsweep",
        dir.path().join("missing").to_str().unwrap(),
        "--json-errors",
    ])
    .unwrap();
    assert!(cli.json_errors);

    let mut reporter = zipsweep::output::TextReporter::new(Vec::new(), false);
    let err = zipsweep::run_with_reporter(&cli, &mut reporter).unwrap_err();
    let structured = StructuredError::new(&err, ExitCode::GeneralError);
    let json: serde_json::Value = serde_json::to_value(&structured).unwrap();

    assert_eq!(json["code"], "ZS001");
    assert_eq!(json["exit_code"], 1);
    assert_eq!(json["interrupted"], false);
    assert!(json["message"].as_str().unwrap().contains("missing"));
}

#[test]
fn test_output_format_display() {
    assert_eq!(OutputFormat::Text.to_string(), "text");
    assert_eq!(OutputFormat::Json.to_string(), "json");
}

#[test]
fn test_trash_flag_is_accepted() {
    let cli = Cli::try_parse_from(["zipsweep", "/tmp", "--trash", "-q"]).unwrap();
    assert!(cli.trash);
    assert!(cli.quiet);
}
