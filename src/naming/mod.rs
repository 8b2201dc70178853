//! Name resolution for one namespace scope
//!
//! - [`QualifiedName`] and identity lookup keys
//! - [`NameContext`]: definitions, references and aliases of a scope
//! - reserved-word checks used when new names are generated

mod context;
mod name;
pub mod reserved;

pub use context::{AliasDiff, AliasEntry, AliasSnapshot, NameContext, Resolution};
pub use name::{QualifiedName, alias_key, lookup_key, same_namespace};
