use super::fixtures::{create_test_tree, names, run, run_isolated, snapshot, write_zip};
use std::fs;
use std::io::Write;
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zipsweep::archive::inspect_member;
use zipsweep::error::ExitCode;

#[test]
fn test_full_tree_execute_and_compress() {
    let dir = tempdir().unwrap();
    let (folder1, folder2, folder3) = create_test_tree(dir.path());

    let (code, log) = run(&[dir.path().to_str().unwrap(), "-e", "-c"]);
    assert_eq!(code, ExitCode::Success);

    // folder1: every orphan became an archive
    assert_eq!(names(&folder1), vec!["test1.zip", "test2.zip", "test3.zip"]);
    let member = inspect_member(&folder1.join("test1.zip"), "test1.txt")
        .unwrap()
        .unwrap();
    assert_eq!(member.size, "orphan 1".len() as u64);

    // folder2: duplicate removed, archive kept
    assert_eq!(names(&folder2), vec!["othertest1.zip"]);

    // folder3: archives only, untouched
    assert_eq!(names(&folder3), vec!["zip1.zip", "zip2.zip", "zip3.zip"]);

    assert!(log.contains("Orphan: test1.txt"));
    assert!(log.contains("Duplicate found: othertest1.txt -> othertest1.zip"));
    assert!(log.contains("[DELETED]"));
    assert_eq!(log.matches("[COMPRESSED]").count(), 3);
    assert!(!log.contains("[FAILED]"));
    assert!(log.contains("Summary: 1 duplicate(s)"));
    assert!(log.contains("3 orphan(s), 1 deleted, 3 compressed, 0 failed"));
}

#[test]
fn test_dry_run_changes_nothing() {
    let dir = tempdir().unwrap();
    create_test_tree(dir.path());
    let before = snapshot(dir.path());

    let (code, log) = run(&[dir.path().to_str().unwrap(), "-c", "--paranoid"]);
    assert_eq!(code, ExitCode::Success);

    // Same paths, same bytes
    assert_eq!(before, snapshot(dir.path()));
    assert!(log.contains("Duplicate found: othertest1.txt -> othertest1.zip"));
    assert!(log.contains("Orphan: test2.txt"));
    assert!(!log.contains("[DELETED]"));
    assert!(!log.contains("[COMPRESSED]"));
}

#[test]
fn test_discovery_lines_match_between_modes() {
    let dry = tempdir().unwrap();
    create_test_tree(dry.path());
    let live = tempdir().unwrap();
    create_test_tree(live.path());

    let (_, dry_log) = run(&[dry.path().to_str().unwrap(), "-c"]);
    let (_, live_log) = run(&[live.path().to_str().unwrap(), "-c", "-e"]);

    let discovery = |log: &str, root: &str| -> Vec<String> {
        log.lines()
            .filter(|l| l.contains("Duplicate found") || l.contains("Orphan:"))
            .map(|l| l.replace(root, ""))
            .collect()
    };
    assert_eq!(
        discovery(&dry_log, dry.path().to_str().unwrap()),
        discovery(&live_log, live.path().to_str().unwrap())
    );
}

#[test]
fn test_second_run_is_a_no_op() {
    let dir = tempdir().unwrap();
    let (folder1, folder2, folder3) = create_test_tree(dir.path());
    let root = dir.path().to_str().unwrap();

    run(&[root, "-e", "-c"]);
    let after_first: Vec<_> = [&folder1, &folder2, &folder3]
        .iter()
        .map(|f| names(f))
        .collect();

    let (code, log) = run(&[root, "-e", "-c"]);
    assert_eq!(code, ExitCode::Success);
    let after_second: Vec<_> = [&folder1, &folder2, &folder3]
        .iter()
        .map(|f| names(f))
        .collect();

    assert_eq!(after_first, after_second);
    assert!(!log.contains("Duplicate found"));
    assert!(!log.contains("Orphan:"));
}

#[test]
fn test_changed_content_is_not_deleted() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("report.txt"), "version 2").unwrap();
    write_zip(&dir.path().join("report.zip"), &[("report.txt", "version 1")]);

    let (_, log) = run(&[dir.path().to_str().unwrap(), "-e", "-c"]);

    assert!(dir.path().join("report.txt").exists());
    assert!(!log.contains("Duplicate found"));
    // Not an orphan either: the archive path is taken
    assert!(!log.contains("Orphan:"));
}

#[test]
fn test_member_name_must_match_exactly() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("data.csv"), "a,b").unwrap();
    write_zip(&dir.path().join("data.zip"), &[("data.txt", "a,b")]);

    let (_, log) = run(&[dir.path().to_str().unwrap(), "-e"]);

    assert!(dir.path().join("data.csv").exists());
    assert!(!log.contains("Duplicate found"));
}

#[test]
fn test_encrypted_member_matches_from_header() {
    use zip::unstable::write::FileOptionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("secret.txt"), "some data").unwrap();
    let mut writer =
        zip::ZipWriter::new(fs::File::create(dir.path().join("secret.zip")).unwrap());
    writer
        .start_file(
            "secret.txt",
            SimpleFileOptions::default().with_deprecated_encryption(b"hunter2"),
        )
        .unwrap();
    writer.write_all(b"some data").unwrap();
    writer.finish().unwrap();

    let (_, log) = run(&[dir.path().to_str().unwrap(), "-e"]);

    assert!(log.contains("Duplicate found: secret.txt -> secret.zip"));
    assert!(log.contains("[DELETED]"));
    assert_eq!(names(dir.path()), vec!["secret.zip"]);
}

#[test]
fn test_several_loose_files_share_one_archive() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("photo.jpg"), "jpeg").unwrap();
    fs::write(dir.path().join("photo.txt"), "caption").unwrap();
    write_zip(
        &dir.path().join("photo.zip"),
        &[("photo.jpg", "jpeg"), ("photo.txt", "caption")],
    );

    let (_, log) = run(&[dir.path().to_str().unwrap(), "-e"]);

    assert_eq!(log.matches("[DELETED]").count(), 2);
    assert_eq!(names(dir.path()), vec!["photo.zip"]);
}

#[test]
fn test_unreadable_archive_blocks_orphan_compression() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "text").unwrap();
    fs::write(dir.path().join("notes.zip"), "not a zip").unwrap();

    let (code, log) = run(&[dir.path().to_str().unwrap(), "-e", "-c"]);

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("notes.txt").exists());
    assert_eq!(fs::read(dir.path().join("notes.zip")).unwrap(), b"not a zip");
    assert!(!log.contains("Duplicate found"));
    assert!(!log.contains("Orphan:"));
}

#[test]
fn test_subfolders_are_paired_independently() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    // Archive in the parent, loose file in the child: no pairing
    write_zip(&dir.path().join("a.zip"), &[("a.txt", "x")]);
    fs::write(sub.join("a.txt"), "x").unwrap();

    let (_, log) = run(&[dir.path().to_str().unwrap(), "-e", "-c"]);

    assert!(!log.contains("Duplicate found"));
    assert!(log.contains("Orphan: a.txt"));
    assert_eq!(names(&sub), vec!["a.zip"]);
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    let cli = <zipsweep::cli::Cli as clap::Parser>::try_parse_from([
        "zipsweep",
        missing.to_str().unwrap(),
    ])
    .unwrap();
    let mut out = Vec::new();
    let mut reporter = zipsweep::output::TextReporter::new(&mut out, false);

    let err = zipsweep::run_with_reporter(&cli, &mut reporter).unwrap_err();
    assert!(format!("{err:#}").contains("Path not found"));
    drop(reporter);
    assert!(out.is_empty());
}

#[test]
fn test_root_that_is_a_file_is_fatal() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "x").unwrap();
    let cli =
        <zipsweep::cli::Cli as clap::Parser>::try_parse_from(["zipsweep", file.to_str().unwrap()])
            .unwrap();
    let mut reporter = zipsweep::output::TextReporter::new(Vec::new(), false);

    let err = zipsweep::run_with_reporter(&cli, &mut reporter).unwrap_err();
    assert!(format!("{err:#}").contains("Not a directory"));
    assert!(file.exists());
}

#[test]
fn test_json_output_mode() {
    let dir = tempdir().unwrap();
    create_test_tree(dir.path());
    let mut out = Vec::new();
    {
        let mut reporter = zipsweep::output::JsonReporter::new(&mut out, true);
        run_isolated(&[dir.path().to_str().unwrap(), "-c", "--output", "json"], &mut reporter);
    }
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(json["summary"]["folders"], 4);
    assert_eq!(json["summary"]["duplicates"], 1);
    assert_eq!(json["summary"]["orphans"], 3);
    assert_eq!(json["summary"]["deleted"], 0);
    assert_eq!(json["summary"]["interrupted"], false);
}
