//! Rename: point already converted code at the identities of later plans

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::error::RewriteError;
use super::output::write_atomic;
use super::pipeline::rewrite_source;
use super::substitute::ReviewItem;
use crate::project::{IdentityIndex, WalkOptions, collect_source_files, load_bytes};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameReport {
    pub rewritten: Vec<PathBuf>,
    pub substituted: usize,
    pub review: Vec<ReviewItem>,
}

/// Rewrite every source file under `dirs` against `index`. A file is
/// written back only when a reference in it changed.
pub fn rename(index: &IdentityIndex, dirs: &[PathBuf], walk: &WalkOptions) -> Result<RenameReport, RewriteError> {
    let mut files = Vec::new();
    for dir in dirs {
        files.extend(collect_source_files(dir, walk)?);
    }

    let outcomes: Vec<Option<(PathBuf, usize, Vec<ReviewItem>)>> = files
        .par_iter()
        .map(|file| rename_file(&file.absolute, &file.relative, index))
        .collect::<Result<_, _>>()?;

    let mut report = RenameReport::default();
    for (path, substituted, review) in outcomes.into_iter().flatten() {
        report.rewritten.push(path);
        report.substituted += substituted;
        report.review.extend(review);
    }
    info!(
        files = report.rewritten.len(),
        substituted = report.substituted,
        "rename finished"
    );
    Ok(report)
}

fn rename_file(
    path: &Path,
    relative: &str,
    index: &IdentityIndex,
) -> Result<Option<(PathBuf, usize, Vec<ReviewItem>)>, RewriteError> {
    let bytes = load_bytes(path)?;
    let Ok(text) = std::str::from_utf8(&bytes) else {
        warn!(path = relative, "not valid UTF-8, file skipped");
        return Ok(None);
    };
    let output = rewrite_source(text, index);
    if output.substituted == 0 {
        return Ok(None);
    }
    write_atomic(path, &output.text)?;
    debug!(path = relative, substituted = output.substituted, "file renamed");
    let review = output
        .review
        .into_iter()
        .map(|item| ReviewItem {
            path: Some(relative.to_string()),
            ..item
        })
        .collect();
    Ok(Some((path.to_path_buf(), output.substituted, review)))
}
