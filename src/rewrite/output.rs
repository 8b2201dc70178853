//! Writing rewritten files

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::error::RewriteError;

/// Write through a temporary sibling renamed over the target
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), RewriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RewriteError::io(parent, e))?;
    }
    let tmp = temp_sibling(path);
    fs::write(&tmp, contents).map_err(|e| RewriteError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        RewriteError::io(path, e)
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// One lock per target path. Keys are lowercased so two spellings of a
/// path on a case-insensitive filesystem share a lock.
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: Mutex<FxHashMap<String, Arc<Mutex<()>>>>,
}

impl PathLocks {
    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let key = path.to_string_lossy().to_lowercase();
        self.locks.lock().entry(key).or_default().clone()
    }
}
