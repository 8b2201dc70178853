//! Parallel planning of a source tree

use std::path::Path;

use rayon::prelude::*;
use tracing::info;

use super::aggregate::aggregate;
use super::error::ProjectError;
use super::file_loader::{WalkOptions, collect_source_files, load_bytes};
use super::result::ProjectResult;
use crate::planner::{FilePlan, PlannerConfig, plan_bytes};

/// Walk `root`, plan every file on the rayon pool, then reconcile the plans
/// in path order.
pub fn plan_project(root: &Path, config: &PlannerConfig, walk: &WalkOptions) -> Result<ProjectResult, ProjectError> {
    config.validate()?;
    let root = root
        .canonicalize()
        .map_err(|e| ProjectError::io(root, e))?;
    let files = collect_source_files(&root, walk)?;

    let mut plans: Vec<FilePlan> = files
        .par_iter()
        .map(|file| load_bytes(&file.absolute).map(|bytes| plan_bytes(&file.relative, &bytes, config)))
        .collect::<Result<_, _>>()?;
    plans.sort_by(|a, b| a.path.cmp(&b.path));

    let result = aggregate(root.to_string_lossy(), config, plans);
    info!(
        files = result.files.len(),
        renamed = result.renamed_count(),
        errors = result.error_count(),
        "project planned"
    );
    Ok(result)
}
