//! Error types for project-level operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::planner::ConfigError;

/// Errors raised while walking, planning or persisting a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Configuration rejected before any file is read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Directory not found: {}", .0.display())]
    NotADirectory(PathBuf),

    /// IO error on a specific path.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

impl ProjectError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A persisted plan that can no longer be trusted.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("plan signature mismatch, the plan file was modified")]
    Tampered,

    #[error("plan file has no signature")]
    MissingSignature,

    /// JSON parsing or serialization error.
    #[error("malformed plan file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("plan was made for dialect '{found}', expected '{expected}'")]
    Dialect { found: String, expected: String },

    /// Source changed between plan and convert.
    #[error("source file {path} changed since the plan was made")]
    Stale { path: String },

    #[error("source file {path} listed in the plan cannot be read: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid signing key")]
    InvalidKey,
}
