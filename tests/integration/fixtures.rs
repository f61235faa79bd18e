//! Shared helpers for building folder trees.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use zip::write::SimpleFileOptions;
use zipsweep::cli::Cli;
use zipsweep::error::ExitCode;
use zipsweep::output::{Reporter, TextReporter};

/// Write a zip holding the given members.
pub fn write_zip(path: &Path, members: &[(&str, &str)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, data) in members {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// The three-folder tree:
/// - `folder1`: three orphans `test{1,2,3}.txt`
/// - `folder2`: `othertest1.txt` plus an archive holding the same content
/// - `folder3`: only archives `zip{1,2,3}.zip`
pub fn create_test_tree(base: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let folder1 = base.join("folder1");
    let folder2 = base.join("folder2");
    let folder3 = base.join("folder3");
    for folder in [&folder1, &folder2, &folder3] {
        fs::create_dir(folder).unwrap();
    }

    for i in 1..=3 {
        fs::write(folder1.join(format!("test{i}.txt")), format!("orphan {i}")).unwrap();
    }

    fs::write(folder2.join("othertest1.txt"), "some data").unwrap();
    write_zip(
        &folder2.join("othertest1.zip"),
        &[("othertest1.txt", "some data")],
    );

    for i in 1..=3 {
        let member = format!("tmp{i}.txt");
        let data = format!("data {i}");
        write_zip(
            &folder3.join(format!("zip{i}.zip")),
            &[(member.as_str(), data.as_str())],
        );
    }

    (folder1, folder2, folder3)
}

/// Run the full application against `reporter`, isolated from the host.
///
/// The environment is cleared and, unless `args` names one, an empty config
/// file replaces the platform config.
pub fn run_isolated(args: &[&str], reporter: &mut dyn Reporter) -> ExitCode {
    let mut code = None;
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file("empty.toml", "")?;
        let empty_config = jail.directory().join("empty.toml");

        let mut argv = vec!["zipsweep".to_string()];
        argv.extend(args.iter().map(|a| a.to_string()));
        if !args.contains(&"--config") {
            argv.push("--config".to_string());
            argv.push(empty_config.to_string_lossy().into_owned());
        }

        let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
        code = Some(zipsweep::run_with_reporter(&cli, reporter).map_err(|e| format!("{e:#}"))?);
        Ok(())
    });
    code.unwrap()
}

/// Run the full application with text output captured.
pub fn run(args: &[&str]) -> (ExitCode, String) {
    let mut out = Vec::new();
    let code = {
        let mut reporter = TextReporter::new(&mut out, false);
        run_isolated(args, &mut reporter)
    };
    (code, String::from_utf8(out).unwrap())
}

/// Sorted file names directly inside a folder.
pub fn names(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(folder)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Every path under `root` with its contents (`None` for directories).
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let contents = entry
                .file_type()
                .is_file()
                .then(|| fs::read(entry.path()).unwrap());
            (entry.path().to_path_buf(), contents)
        })
        .collect()
}
