//! Identifier validation and reserved-word sanitizing

use crate::parser::keywords::is_reserved;

/// Namespaces PHP keeps for itself
const RESERVED_NAMESPACES: &[&str] = &["PHP"];

/// `[a-zA-Z_\x80-\xff][a-zA-Z0-9_\x80-\xff]*`
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || !c.is_ascii() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii())
}

/// A namespace segment that can be written as-is
pub fn is_valid_segment(segment: &str) -> bool {
    is_valid_identifier(segment) && !is_reserved(segment)
}

/// Every segment is a valid, non-reserved identifier and the first one is
/// not a namespace reserved by PHP
pub fn is_valid_namespace(namespace: &str) -> bool {
    let mut segments = namespace.split('\\');
    let first_allowed = segments
        .clone()
        .next()
        .is_some_and(|first| !RESERVED_NAMESPACES.contains(&first));
    first_allowed && segments.all(is_valid_segment)
}

/// Append `_` to every reserved segment
pub fn sanitize_namespace(namespace: &str) -> String {
    namespace
        .split('\\')
        .map(|segment| sanitize_with_suffix(segment, "_"))
        .collect::<Vec<_>>()
        .join("\\")
}

pub fn sanitize_with_suffix(name: &str, suffix: &str) -> String {
    if is_reserved(name) {
        format!("{name}{suffix}")
    } else {
        name.to_string()
    }
}

pub fn sanitize_with_prefix(name: &str, prefix: &str) -> String {
    if is_reserved(name) {
        format!("{prefix}{name}")
    } else {
        name.to_string()
    }
}

/// Upper-case the first letter
pub fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Acme", true)]
    #[case("Acme\\Legacy_Lib", true)]
    #[case("Acme\\List", false)]
    #[case("PHP\\Tools", false)]
    #[case("1Acme", false)]
    #[case("Acme\\", false)]
    fn test_is_valid_namespace(#[case] namespace: &str, #[case] valid: bool) {
        assert_eq!(is_valid_namespace(namespace), valid);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_namespace("Acme\\List\\Array"), "Acme\\List_\\Array_");
        assert_eq!(sanitize_with_prefix("Function", "Db"), "DbFunction");
        assert_eq!(sanitize_with_prefix("Query", "Db"), "Query");
        assert_eq!(ucfirst("foo_bar"), "Foo_bar");
    }
}
