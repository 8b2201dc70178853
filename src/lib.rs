//! # psr4
//!
//! Plans and applies the migration of legacy PHP source trees (global
//! `Vendor_Package_Class` names, PSR-0 layouts) to prefixed PSR-4
//! namespaces.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! report    → Tables and names-changed JSON for a plan
//!   ↓
//! rewrite   → Qualify / substitute / reimport stages, convert, rename, clear
//!   ↓
//! project   → Source walking, parallel planning, aggregation, signed plans
//!   ↓
//! planner   → Per-file declarations and mapping decisions
//!   ↓
//! naming    → Qualified names, scope name context, reserved words
//!   ↓
//! parser    → Logos lexer, statement tree, reference scanner
//!   ↓
//! base      → Primitives (SymbolKind, TextRange, LineIndex, constants)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → naming → planner → project → rewrite)
// ============================================================================

/// Foundation types: symbol kinds, positions, constants
pub mod base;

/// Parser: Logos lexer, statement tree, reference scanner
pub mod parser;

/// Names and name resolution within one namespace scope
pub mod naming;

/// Per-file planning: declarations, mapping decisions, configuration
pub mod planner;

/// Project planning, aggregation and the signed plan document
pub mod project;

/// Source rewriting and the filesystem phases built on it
pub mod rewrite;

/// Plan inspection output
pub mod report;

mod error;

pub use error::{Error, Result};

// Re-export the entry points of each phase
pub use planner::{PlannerConfig, plan_file};
pub use project::{ProjectResult, WalkOptions, load_plan, plan_project, save_plan};
pub use rewrite::{ConvertOptions, clear, convert, rename};

// Re-export foundation types
pub use base::{LineIndex, Position, Span, SymbolKind, TextRange, TextSize};
