//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (invalid tokens)
//! - E02xx: Structural errors (brackets, statement terminators)
//! - E03xx: Declaration errors (classes, functions, constants)
//! - E05xx: Import/namespace errors
//! - E09xx: Generic/fallback errors

use std::fmt;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors (invalid tokens)
    // =========================================================================
    /// Invalid or unexpected character in source
    E0101,

    // =========================================================================
    // E02xx: Structural errors (brackets, statement terminators)
    // =========================================================================
    /// Unclosed bracket
    E0201,
    /// Unexpected closing bracket
    E0202,
    /// Missing `;` or close tag
    E0203,

    // =========================================================================
    // E03xx: Declaration errors
    // =========================================================================
    /// Class-like or function declaration without a body
    E0301,

    // =========================================================================
    // E05xx: Import/namespace errors
    // =========================================================================
    /// Malformed `use` statement
    E0501,
    /// Malformed `declare` statement
    E0502,
    /// Malformed `namespace` statement
    E0503,

    // =========================================================================
    // E09xx: Generic/fallback errors
    // =========================================================================
    /// Unexpected token in current context
    E0901,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0301 => "E0301",
            Self::E0501 => "E0501",
            Self::E0502 => "E0502",
            Self::E0503 => "E0503",
            Self::E0901 => "E0901",
        }
    }

    /// Default message used when the parser has nothing more specific
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "unexpected character",
            Self::E0201 => "unclosed bracket",
            Self::E0202 => "unexpected closing bracket",
            Self::E0203 => "expected ';'",
            Self::E0301 => "declaration is missing its body",
            Self::E0501 => "malformed use statement",
            Self::E0502 => "malformed declare statement",
            Self::E0503 => "malformed namespace statement",
            Self::E0901 => "unexpected token",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
