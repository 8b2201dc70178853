//! Mapping decisions and per-file plans
//!
//! Everything here is serialized into the plan document, so field names are
//! part of the persisted format.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::SymbolKind;
use crate::naming::QualifiedName;
use crate::parser::Directive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Interface,
    Trait,
    Enum,
    Function,
    Constant,
    /// A top-level `if` block holding declarations
    Conditional,
}

impl DeclarationKind {
    pub fn symbol_kind(self) -> Option<SymbolKind> {
        match self {
            Self::Class | Self::Interface | Self::Trait | Self::Enum => Some(SymbolKind::Type),
            Self::Function => Some(SymbolKind::Function),
            Self::Constant => Some(SymbolKind::Constant),
            Self::Conditional => None,
        }
    }

    pub fn is_type(self) -> bool {
        self.symbol_kind() == Some(SymbolKind::Type)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Trait => "trait",
            Self::Enum => "enum",
            Self::Function => "function",
            Self::Constant => "const",
            Self::Conditional => "conditional",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One declared name of a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub kind: DeclarationKind,
    pub original: QualifiedName,
    pub new: QualifiedName,
}

impl Component {
    pub fn symbol_kind(&self) -> SymbolKind {
        self.kind.symbol_kind().unwrap_or(SymbolKind::Constant)
    }

    pub fn is_renamed(&self) -> bool {
        self.original.lookup_key(self.symbol_kind()) != self.new.lookup_key(self.symbol_kind())
    }

    fn describe(&self) -> String {
        format!("{} {}", self.kind, self.original)
    }
}

/// Line and byte span of a statement, lines 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start_line: usize,
    pub end_line: usize,
    pub start_offset: u32,
    pub end_offset: u32,
}

/// Half-open token index range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    pub first: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDecision {
    pub kind: DeclarationKind,
    pub span: SourceSpan,
    pub tokens: TokenSpan,
    /// Enclosing namespace statement, absent for files without one
    pub namespace_tokens: Option<TokenSpan>,
    pub original_namespace: Option<SmolStr>,
    pub new_namespace: Option<SmolStr>,
    pub components: Vec<Component>,
    /// Compiler directives in effect at the declaration
    pub directives: Vec<Directive>,
    /// Path relative to the destination, `/`-separated
    pub target: String,
    pub exclusive: bool,
    pub risky: bool,
    /// Matched an ignore rule and kept its identity
    #[serde(default)]
    pub ignored: bool,
    pub summary: String,
}

impl MappingDecision {
    pub fn summarize(kind: DeclarationKind, components: &[Component]) -> String {
        let parts: Vec<String> = components.iter().map(Component::describe).collect();
        match kind {
            DeclarationKind::Conditional => parts
                .iter()
                .map(|part| format!("conditional {part}"))
                .collect::<Vec<_>>()
                .join(", "),
            _ => parts.join(", "),
        }
    }

    /// Identity of an exclusive decision
    pub fn primary(&self) -> Option<&Component> {
        self.exclusive.then(|| self.components.first()).flatten()
    }

    pub fn is_renamed(&self) -> bool {
        self.components.iter().any(Component::is_renamed)
    }

    pub fn is_conditional(&self) -> bool {
        self.kind == DeclarationKind::Conditional
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanErrorKind {
    Syntax,
    InvalidStatement,
    Conflict,
    Encoding,
}

impl PlanErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::InvalidStatement => "invalid-statement",
            Self::Conflict => "conflict",
            Self::Encoding => "encoding",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanError {
    pub kind: PlanErrorKind,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl PlanError {
    pub fn new(kind: PlanErrorKind, message: impl Into<String>, span: Option<SourceSpan>) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn conflict(later: &MappingDecision, earlier: &MappingDecision, earlier_file: &str) -> Self {
        Self::new(
            PlanErrorKind::Conflict,
            format!(
                "Map error, conflict between {} and {} on file {}",
                later.summary, earlier.summary, earlier_file
            ),
            Some(later.span),
        )
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Planning outcome of one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePlan {
    /// Relative to the source root, `/`-separated
    pub path: String,
    /// sha256 hex of the file content
    pub hash: String,
    pub has_include: bool,
    pub decisions: Vec<MappingDecision>,
    pub errors: Vec<PlanError>,
}

impl FilePlan {
    pub fn is_risky(&self) -> bool {
        self.has_include || self.decisions.iter().any(|d| d.risky)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(kind: DeclarationKind, original: &str, new: &str) -> Component {
        Component {
            kind,
            original: QualifiedName::new(original),
            new: QualifiedName::new(new),
        }
    }

    #[test]
    fn test_summary_forms() {
        let class = [component(DeclarationKind::Class, "Foo_Bar", "Acme\\Foo\\Bar")];
        assert_eq!(MappingDecision::summarize(DeclarationKind::Class, &class), "class Foo_Bar");

        let consts = [
            component(DeclarationKind::Constant, "A", "A"),
            component(DeclarationKind::Constant, "B", "B"),
        ];
        assert_eq!(MappingDecision::summarize(DeclarationKind::Constant, &consts), "const A, const B");

        let conditional = [
            component(DeclarationKind::Class, "X", "X"),
            component(DeclarationKind::Function, "f", "f"),
        ];
        assert_eq!(
            MappingDecision::summarize(DeclarationKind::Conditional, &conditional),
            "conditional class X, conditional function f"
        );
    }

    #[test]
    fn test_component_rename_ignores_case_for_types() {
        assert!(!component(DeclarationKind::Class, "Ns\\foo", "NS\\Foo").is_renamed());
        assert!(component(DeclarationKind::Constant, "FOO", "Foo").is_renamed());
    }
}
