#![allow(clippy::unwrap_used)]

use rstest::rstest;

use psr4::SymbolKind;
use psr4::parser::{doc_references, parse, scan_references};

fn references(source: &str) -> Vec<(String, SymbolKind)> {
    let tree = parse(source);
    scan_references(&tree, 0, tree.token_count())
        .into_iter()
        .map(|r| (r.text.to_string(), r.kind))
        .collect()
}

#[rstest]
#[case("<?php new Foo_Bar();", "Foo_Bar", SymbolKind::Type)]
#[case("<?php Foo_Bar::create();", "Foo_Bar", SymbolKind::Type)]
#[case("<?php $x instanceof \\A\\B;", "\\A\\B", SymbolKind::Type)]
#[case("<?php try {} catch (Some_Error $e) {}", "Some_Error", SymbolKind::Type)]
#[case("<?php function f(?Foo $a): Bar {}", "Foo", SymbolKind::Type)]
#[case("<?php helper(1);", "helper", SymbolKind::Function)]
#[case("<?php echo SOME_LIMIT;", "SOME_LIMIT", SymbolKind::Constant)]
#[case("<?php namespace\\sub\\f();", "namespace\\sub\\f", SymbolKind::Function)]
fn test_reference_kind(#[case] source: &str, #[case] name: &str, #[case] kind: SymbolKind) {
    let refs = references(source);
    assert!(
        refs.contains(&(name.to_string(), kind)),
        "expected {name} as {kind:?} in {refs:?}"
    );
}

#[test]
fn test_declarations_and_members_are_not_references() {
    let refs = references("<?php\nclass A { const B = 1; public function c() { return $this->d() + self::B; } }\n");
    let names: Vec<&str> = refs.iter().map(|(name, _)| name.as_str()).collect();
    for skipped in ["A", "B", "c", "d", "self"] {
        assert!(!names.contains(&skipped), "{skipped} reported in {names:?}");
    }
}

#[test]
fn test_imports_are_not_references() {
    let refs = references("<?php\nuse Vendor\\Lib;\nnew Lib();\n");
    assert_eq!(refs, vec![("Lib".to_string(), SymbolKind::Type)]);
}

#[test]
fn test_doc_references() {
    let comment = "/**\n * @param Foo_Bar|null $a\n * @return \\Vendor\\Thing[]\n * @throws Some_Error\n */";
    let names: Vec<String> = doc_references(comment).into_iter().map(|r| r.name.to_string()).collect();
    assert_eq!(names, vec!["Foo_Bar", "\\Vendor\\Thing", "Some_Error"]);
}
