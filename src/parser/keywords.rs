//! PHP keyword tables
//!
//! Keywords are case-insensitive in PHP, so every lookup lowercases first.

use super::SyntaxKind;

/// Words that can never be used as a class name or namespace segment.
///
/// Includes the soft-reserved type names (`int`, `string`, ...) so that
/// generated identities stay valid on every supported PHP version.
pub const RESERVED_WORDS: &[&str] = &[
    "__halt_compiler", "abstract", "and", "array", "as", "bool", "break", "callable", "case",
    "catch", "class", "clone", "const", "continue", "declare", "default", "die", "do", "echo",
    "else", "elseif", "empty", "enddeclare", "endfor", "endforeach", "endif", "endswitch",
    "endwhile", "eval", "exit", "extends", "false", "final", "finally", "float", "fn", "for",
    "foreach", "function", "global", "goto", "if", "implements", "include", "include_once",
    "instanceof", "insteadof", "int", "interface", "isset", "iterable", "list", "match", "mixed",
    "namespace", "never", "new", "null", "numeric", "object", "or", "print", "private",
    "protected", "public", "readonly", "require", "require_once", "resource", "return", "static",
    "string", "switch", "throw", "trait", "true", "try", "unset", "use", "var", "void", "while",
    "xor", "yield",
];

/// Names that look like identifiers but never refer to a user symbol
pub const BUILTIN_NAMES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "parent", "self", "static", "string", "true", "void",
];

/// Check whether `word` is reserved (case-insensitive)
pub fn is_reserved(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    RESERVED_WORDS.binary_search(&lower.as_str()).is_ok()
}

/// Check whether `word` is a builtin type or special class name
pub fn is_builtin_name(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    BUILTIN_NAMES.binary_search(&lower.as_str()).is_ok()
}

/// Magic constants like `__DIR__` are resolved by the engine, never by name
pub fn is_magic_constant(word: &str) -> bool {
    matches!(
        word.to_ascii_uppercase().as_str(),
        "__CLASS__"
            | "__DIR__"
            | "__FILE__"
            | "__FUNCTION__"
            | "__LINE__"
            | "__METHOD__"
            | "__NAMESPACE__"
            | "__TRAIT__"
            | "__PROPERTY__"
            | "__COMPILER_HALT_OFFSET__"
    )
}

/// Classify an identifier as a keyword token, if it is one.
pub fn keyword_kind(word: &str) -> Option<SyntaxKind> {
    if is_magic_constant(word) {
        return Some(SyntaxKind::MAGIC_CONST);
    }
    let kind = match word.to_ascii_lowercase().as_str() {
        "abstract" => SyntaxKind::ABSTRACT_KW,
        "as" => SyntaxKind::AS_KW,
        "case" => SyntaxKind::CASE_KW,
        "catch" => SyntaxKind::CATCH_KW,
        "class" => SyntaxKind::CLASS_KW,
        "const" => SyntaxKind::CONST_KW,
        "declare" => SyntaxKind::DECLARE_KW,
        "else" => SyntaxKind::ELSE_KW,
        "elseif" => SyntaxKind::ELSEIF_KW,
        "enddeclare" => SyntaxKind::ENDDECLARE_KW,
        "endif" => SyntaxKind::ENDIF_KW,
        "exit" | "die" => SyntaxKind::EXIT_KW,
        "extends" => SyntaxKind::EXTENDS_KW,
        "final" => SyntaxKind::FINAL_KW,
        "finally" => SyntaxKind::FINALLY_KW,
        "fn" => SyntaxKind::FN_KW,
        "function" => SyntaxKind::FUNCTION_KW,
        "goto" => SyntaxKind::GOTO_KW,
        "__halt_compiler" => SyntaxKind::HALT_COMPILER_KW,
        "if" => SyntaxKind::IF_KW,
        "implements" => SyntaxKind::IMPLEMENTS_KW,
        "include" | "include_once" | "require" | "require_once" => SyntaxKind::INCLUDE_KW,
        "instanceof" => SyntaxKind::INSTANCEOF_KW,
        "insteadof" => SyntaxKind::INSTEADOF_KW,
        "interface" => SyntaxKind::INTERFACE_KW,
        "namespace" => SyntaxKind::NAMESPACE_KW,
        "new" => SyntaxKind::NEW_KW,
        "readonly" => SyntaxKind::READONLY_KW,
        "return" => SyntaxKind::RETURN_KW,
        "static" => SyntaxKind::STATIC_KW,
        "trait" => SyntaxKind::TRAIT_KW,
        "use" => SyntaxKind::USE_KW,
        "and" | "array" | "break" | "callable" | "clone" | "continue" | "default" | "do"
        | "echo" | "empty" | "endfor" | "endforeach" | "endswitch" | "endwhile" | "eval"
        | "for" | "foreach" | "global" | "isset" | "list" | "match" | "or" | "print"
        | "private" | "protected" | "public" | "switch" | "throw" | "try" | "unset" | "var"
        | "while" | "xor" | "yield" => SyntaxKind::KEYWORD,
        _ => return None,
    };
    Some(kind)
}
