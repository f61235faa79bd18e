use super::fixtures::run;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs::{self, File};
use tempfile::tempdir;
use zip::CompressionMethod;
use zipsweep::archive::Compression;
use zipsweep::config::Config;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.chunk_size, 64 * 1024);
}

#[test]
fn test_config_load_from_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
chunk_size = 1024
compression = "stored"
paranoid = true
use_trash = false
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();

    assert_eq!(config.chunk_size, 1024);
    assert_eq!(config.compression, Compression::Stored);
    assert!(config.paranoid);
}

#[test]
fn test_config_file_drives_compression_method() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("log.txt"), "line\n".repeat(100)).unwrap();
    let config = dir.path().join("zipsweep.toml");
    fs::write(&config, "compression = \"stored\"\n").unwrap();

    run(&[
        data.to_str().unwrap(),
        "-e",
        "-c",
        "--config",
        config.to_str().unwrap(),
    ]);

    let mut zip = zip::ZipArchive::new(File::open(data.join("log.zip")).unwrap()).unwrap();
    let member = zip.by_name("log.txt").unwrap();
    assert_eq!(member.compression(), CompressionMethod::Stored);
}

#[test]
fn test_cli_flag_overrides_config_file() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("log.txt"), "line\n".repeat(100)).unwrap();
    let config = dir.path().join("zipsweep.toml");
    fs::write(&config, "compression = \"stored\"\n").unwrap();

    run(&[
        data.to_str().unwrap(),
        "-e",
        "-c",
        "--config",
        config.to_str().unwrap(),
        "--compression",
        "deflated",
    ]);

    let mut zip = zip::ZipArchive::new(File::open(data.join("log.zip")).unwrap()).unwrap();
    let member = zip.by_name("log.txt").unwrap();
    assert_eq!(member.compression(), CompressionMethod::Deflated);
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "this is not toml = = =").unwrap();

    assert!(Config::load_from(Some(&path)).is_err());
    assert_eq!(Config::load(Some(&path)), Config::default());
}
