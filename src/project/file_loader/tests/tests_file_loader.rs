#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::super::*;
use std::fs;
use tempfile::TempDir;

fn tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("lib/Foo")).unwrap();
    fs::create_dir_all(root.join("vendor/x")).unwrap();
    fs::create_dir_all(root.join(".hidden")).unwrap();
    fs::write(root.join("lib/Foo/Bar.php"), "<?php\nclass Foo_Bar {}\n").unwrap();
    fs::write(root.join("lib/helpers.PHP"), "<?php\nfunction h() {}\n").unwrap();
    fs::write(root.join("lib/readme.txt"), "not php").unwrap();
    fs::write(root.join("vendor/x/X.php"), "<?php\n").unwrap();
    fs::write(root.join(".hidden/H.php"), "<?php\n").unwrap();
    dir
}

#[test]
fn test_collect_sorted_relative_paths() {
    let dir = tree();
    let files = collect_source_files(dir.path(), &WalkOptions::default()).unwrap();
    let relative: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
    assert_eq!(
        relative,
        vec![".hidden/H.php", "lib/Foo/Bar.php", "lib/helpers.PHP", "vendor/x/X.php"]
    );
}

#[test]
fn test_collect_skips_ignored_and_dot_paths() {
    let dir = tree();
    let options = WalkOptions {
        ignore_dot_files: true,
        ignore_paths: vec![PathBuf::from("vendor")],
        ..WalkOptions::default()
    };
    let files = collect_source_files(dir.path(), &options).unwrap();
    let relative: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
    assert_eq!(relative, vec!["lib/Foo/Bar.php", "lib/helpers.PHP"]);
}

#[test]
fn test_collect_missing_root() {
    let dir = TempDir::new().unwrap();
    let result = collect_source_files(&dir.path().join("missing"), &WalkOptions::default());
    assert!(matches!(result, Err(ProjectError::NotADirectory(_))));
}

#[test]
fn test_load_file_reads_text() {
    let dir = tree();
    let text = load_file(&dir.path().join("lib/Foo/Bar.php")).unwrap();
    assert!(text.contains("Foo_Bar"));
    assert!(load_file(&dir.path().join("nope.php")).is_err());
}
