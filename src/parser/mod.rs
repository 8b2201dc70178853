//! Lossless PHP parser
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind, HTML/PHP mode switching
//!     ↓
//! Parser → arena of statement nodes over the token stream
//!     ↓
//! Reference scanner / doc grammar → name references with token or byte ranges
//! ```
//!
//! Printing a tree concatenates its tokens, so `parse(text).print() == text`
//! holds for every input. Rewrites never mutate a tree: they compute text
//! edits and parse again.

pub mod doc;
pub mod errors;
pub mod keywords;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;
pub mod references;
mod syntax_kind;
mod tree;

pub use doc::{DocRef, doc_references};
pub use errors::{ErrorCode, SyntaxError};
pub use lexer::{Lexer, Token, tokenize};
pub use parser::{parse, string_literal_value};
pub use references::{NameRef, scan_references};
pub use syntax_kind::SyntaxKind;
pub use tree::{ClassKind, Directive, Node, NodeId, NodeKind, RawToken, Scope, SyntaxTree, UseItem, last_segment};
