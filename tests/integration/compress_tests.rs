use super::fixtures::{run, write_zip};
use std::fs::{self, File, OpenOptions};
use tempfile::tempdir;
use zip::CompressionMethod;
use zipsweep::actions::DeleteConfig;
use zipsweep::archive::{CompressError, CompressOptions, Compression, Compressor};
use zipsweep::scanner::Checksummer;

#[test]
fn test_corrupted_archive_is_rolled_back() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("ledger.txt");
    fs::write(&source, "credit 100\ndebit 40\n").unwrap();

    let created = Compressor::default().create(&source).unwrap();
    let archive = created.archive_path().to_path_buf();
    assert!(archive.exists());

    // Simulate a torn write before verification
    let len = fs::metadata(&archive).unwrap().len();
    OpenOptions::new()
        .write(true)
        .open(&archive)
        .unwrap()
        .set_len(len / 2)
        .unwrap();

    assert!(created.verify().is_err());
    assert!(!archive.exists());
    assert_eq!(
        fs::read_to_string(&source).unwrap(),
        "credit 100\ndebit 40\n"
    );
}

#[test]
fn test_archive_with_wrong_content_is_rolled_back() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("ledger.txt");
    fs::write(&source, "credit 100").unwrap();

    let created = Compressor::default().create(&source).unwrap();
    // Same member name, different bytes
    write_zip(created.archive_path(), &[("ledger.txt", "credit 999")]);

    let err = created.verify().unwrap_err();
    assert!(matches!(err, CompressError::Mismatch { .. }));
    assert!(!dir.path().join("ledger.zip").exists());
    assert!(source.exists());
}

#[test]
fn test_existing_archive_is_never_overwritten() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("a.txt");
    fs::write(&source, "new").unwrap();
    write_zip(&dir.path().join("a.zip"), &[("other.txt", "keep me")]);
    let before = fs::read(dir.path().join("a.zip")).unwrap();

    let err = Compressor::default().create(&source).unwrap_err();

    assert!(matches!(err, CompressError::ArchiveExists(_)));
    assert_eq!(fs::read(dir.path().join("a.zip")).unwrap(), before);
    assert!(source.exists());
}

#[test]
fn test_verified_commit_removes_only_source() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("big.bin");
    fs::write(&source, vec![7u8; 300_000]).unwrap();

    let compressor = Compressor::new(CompressOptions {
        compression: Compression::Deflated,
        paranoid: true,
        checksummer: Checksummer::with_chunk_size(4096),
    });
    let verified = compressor.compress(&source).unwrap();
    assert_eq!(verified.checksum().size, 300_000);

    let archive = verified.archive_path().to_path_buf();
    verified.commit(&DeleteConfig::permanent()).unwrap();

    assert!(!source.exists());
    let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
    assert_eq!(zip.len(), 1);
    let member = zip.by_name("big.bin").unwrap();
    assert_eq!(member.size(), 300_000);
    assert_eq!(member.compression(), CompressionMethod::Deflated);
}

#[test]
fn test_cli_stored_compression_with_paranoid_check() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.md"), "# notes").unwrap();

    let (_, log) = run(&[
        dir.path().to_str().unwrap(),
        "-e",
        "-c",
        "--compression",
        "stored",
        "--paranoid",
    ]);

    assert!(log.contains("Orphan: notes.md"));
    assert!(log.contains("[COMPRESSED]"));
    assert!(!dir.path().join("notes.md").exists());

    let mut zip =
        zip::ZipArchive::new(File::open(dir.path().join("notes.zip")).unwrap()).unwrap();
    let member = zip.by_name("notes.md").unwrap();
    assert_eq!(member.compression(), CompressionMethod::Stored);
    assert_eq!(member.size(), 7);
}

#[test]
fn test_orphan_without_extension_gets_zip_suffix() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("README"), "read me").unwrap();

    run(&[dir.path().to_str().unwrap(), "-e", "-c"]);

    assert!(!dir.path().join("README").exists());
    let mut zip = zip::ZipArchive::new(File::open(dir.path().join("README.zip")).unwrap()).unwrap();
    assert!(zip.by_name("README").is_ok());
}
