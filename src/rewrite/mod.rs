//! Name-resolution and rewrite engine
//!
//! Three stages, each a pure text → text step over a fresh parse:
//!
//! 1. [`qualify`]: every resolvable reference written fully qualified
//! 2. [`substitute`]: qualified references moved to their new identities
//! 3. [`reimport`]: qualified references shortened again through imports
//!
//! On top of them sit the phases that touch the filesystem: [`convert`],
//! [`rename`] and [`clear`].

mod clear;
mod convert;
mod edit;
mod error;
mod extract;
mod fragment;
mod imports;
mod output;
mod pipeline;
mod qualify;
mod rename;
mod scope;
mod substitute;

pub use clear::clear;
pub use convert::{ConvertOptions, ConvertReport, convert};
pub use edit::{TextEdit, apply_edits};
pub use error::RewriteError;
pub use extract::{Extracted, extract};
pub use fragment::Fragment;
pub use imports::reimport;
pub use pipeline::{RewriteOutput, qualify_and_substitute, qualify_source, reimport_source, rewrite_source};
pub use qualify::qualify;
pub use rename::{RenameReport, rename};
pub use substitute::{ReviewItem, Substitution, substitute};
