//! Errors of the convert, rename and clear phases.

use std::path::PathBuf;

use thiserror::Error;

use crate::project::{IntegrityError, ProjectError};

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Plan holds risky decisions and the caller did not accept them.
    #[error("plan is risky ({}), pass --allow-risky to convert anyway", files.join(", "))]
    Risky { files: Vec<String> },

    /// Two fragments cannot share one target file.
    #[error("cannot merge into {target}: {reason}")]
    IncompatibleMerge { target: String, reason: String },

    #[error("{summary} not found in {path}, re-run plan")]
    MissingDeclaration { path: String, summary: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RewriteError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn incompatible(target: &str, reason: impl Into<String>) -> Self {
        Self::IncompatibleMerge {
            target: target.to_string(),
            reason: reason.into(),
        }
    }
}
