//! Mapping planner
//!
//! Computes, for every top-level declaration of a file, its new identity,
//! target path, exclusivity and risk. Planning one file reads nothing but
//! the file text and the [`PlannerConfig`], so files plan independently.

mod config;
mod declaration;
mod decision;
mod mapping;

pub use config::{ConfigError, IgnoreRule, PlannerConfig};
pub use declaration::{Declaration, collect_declarations};
pub use decision::{
    Component, DeclarationKind, FilePlan, MappingDecision, PlanError, PlanErrorKind, SourceSpan, TokenSpan,
};
pub use mapping::{plan_bytes, plan_file};
