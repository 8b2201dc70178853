//! Project-level planning and the plan document
//!
//! - [`collect_source_files`]: the source walker
//! - [`plan_project`]: parallel per-file planning followed by [`aggregate`]
//! - [`ProjectResult`] / [`IdentityIndex`]: reconciled decisions
//! - [`integrity`]: content hashes, signing and verification
//! - [`save_plan`] / [`load_plan`]: the persisted document

mod aggregate;
mod error;
pub mod file_loader;
pub mod integrity;
mod plan_file;
mod planning;
mod result;

pub use aggregate::aggregate;
pub use error::{IntegrityError, ProjectError};
pub use file_loader::{SourceFile, WalkOptions, collect_source_files, load_bytes, load_file};
pub use plan_file::{load_plan, resolve_plan_path, save_plan};
pub use planning::plan_project;
pub use result::{IdentityIndex, IndexEntry, ProjectResult};
