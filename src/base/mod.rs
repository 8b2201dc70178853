//! Foundation types for the migrator.
//!
//! This module provides the primitives every other module builds on:
//! - [`SymbolKind`], [`KindBuckets`] - the three independent identity namespaces
//! - [`TextRange`], [`TextSize`] - source positions (byte offsets)
//! - [`LineIndex`], [`Position`], [`Span`] - line/column conversion
//! - Domain constants (plan file name, includes directory, dialect marker)
//!
//! This module has NO dependencies on other crate modules.

pub mod constants;
mod kind;
mod position;

pub use kind::{KindBuckets, SymbolKind};
pub use position::{LineIndex, Position, Span};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
