//! Crate-level error

use thiserror::Error;

use crate::planner::ConfigError;
use crate::project::{IntegrityError, ProjectError};
use crate::rewrite::RewriteError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
