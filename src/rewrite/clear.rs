//! Clear: remove source files whose declarations were all relocated

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::error::RewriteError;
use crate::project::ProjectResult;
use crate::project::integrity::verify_existing_content_hashes;

/// Files holding at least one decision and no error. Sources still on disk
/// must match the plan. With `dry_run` nothing is deleted.
pub fn clear(result: &ProjectResult, dry_run: bool) -> Result<Vec<PathBuf>, RewriteError> {
    verify_existing_content_hashes(result)?;
    let root = Path::new(&result.source_root);
    let mut removed = Vec::new();
    for file in result
        .files
        .iter()
        .filter(|file| !file.decisions.is_empty() && !file.has_errors())
    {
        let path = root.join(&file.path);
        if !dry_run {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() == std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), "already removed");
                    continue;
                }
                return Err(RewriteError::io(&path, e));
            }
        }
        removed.push(path);
    }
    info!(files = removed.len(), dry_run, "sources cleared");
    Ok(removed)
}
