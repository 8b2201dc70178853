//! Reading and writing plan documents

use std::path::{Path, PathBuf};

use tracing::info;

use super::error::ProjectError;
use super::integrity::{to_signed_bytes, verify_signature};
use super::result::ProjectResult;
use crate::base::constants::DEFAULT_PLAN_FILE;

/// A directory means the default plan file inside it
pub fn resolve_plan_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_PLAN_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Sign and write `result`; returns the written path
pub fn save_plan(result: &ProjectResult, path: &Path, key: &[u8]) -> Result<PathBuf, ProjectError> {
    let path = resolve_plan_path(path);
    let bytes = to_signed_bytes(result, key)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ProjectError::io(parent, e))?;
    }
    std::fs::write(&path, bytes).map_err(|e| ProjectError::io(&path, e))?;
    info!(path = %path.display(), files = result.files.len(), "plan written");
    Ok(path)
}

/// Read a plan and verify its signature
pub fn load_plan(path: &Path, key: &[u8]) -> Result<ProjectResult, ProjectError> {
    let path = resolve_plan_path(path);
    let bytes = std::fs::read(&path).map_err(|e| ProjectError::io(&path, e))?;
    Ok(verify_signature(&bytes, key)?)
}
