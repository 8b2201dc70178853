//! Source tree walking
//!
//! Collects candidate `*.php` files below a root, sorted by relative path.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::error::ProjectError;
use crate::base::constants::PHP_EXTENSION;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOptions {
    pub follow_symlinks: bool,
    /// Skip files and directories whose name starts with `.`
    pub ignore_dot_files: bool,
    /// Relative paths (files or directories) left out of the walk
    pub ignore_paths: Vec<PathBuf>,
}

/// A discovered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub absolute: PathBuf,
    /// Relative to the walk root, `/`-separated
    pub relative: String,
}

/// Collect every PHP file below `root`
pub fn collect_source_files(root: &Path, options: &WalkOptions) -> Result<Vec<SourceFile>, ProjectError> {
    if !root.is_dir() {
        return Err(ProjectError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(options.follow_symlinks)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry, root, options));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_php_extension(entry.path()) {
            continue;
        }
        let Some(relative) = relative_path(entry.path(), root) else {
            continue;
        };
        files.push(SourceFile {
            absolute: entry.path().to_path_buf(),
            relative,
        });
    }
    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

/// Read a source file as UTF-8
pub fn load_file(path: &Path) -> Result<String, ProjectError> {
    std::fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))
}

/// Read a source file as raw bytes
pub fn load_bytes(path: &Path) -> Result<Vec<u8>, ProjectError> {
    std::fs::read(path).map_err(|e| ProjectError::io(path, e))
}

pub fn has_php_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PHP_EXTENSION))
}

/// `/`-separated path of `path` below `root`
pub fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

fn is_skipped(entry: &DirEntry, root: &Path, options: &WalkOptions) -> bool {
    if options.ignore_dot_files && entry.file_name().to_string_lossy().starts_with('.') {
        return true;
    }
    let Ok(relative) = entry.path().strip_prefix(root) else {
        return false;
    };
    options.ignore_paths.iter().any(|ignored| relative == ignored.as_path())
}

#[cfg(test)]
mod tests;
