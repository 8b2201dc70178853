#![allow(clippy::unwrap_used)]

use rstest::rstest;

use psr4::parser::{NodeKind, parse, tokenize};

use crate::helpers::source_fixtures::*;

#[rstest]
#[case::legacy_class(LEGACY_CLASS)]
#[case::legacy_child(LEGACY_CHILD)]
#[case::legacy_adapter(LEGACY_ADAPTER)]
#[case::functions(LEGACY_FUNCTIONS)]
#[case::conditional(LEGACY_CONDITIONAL)]
#[case::namespaced(NAMESPACED)]
#[case::invalid(INVALID)]
#[case::heredoc("<?php\n$a = <<<SQL\n  SELECT {$x->y} FROM t\n  SQL;\n")]
#[case::nowdoc("<?php\n$a = <<<'TXT'\nno $interpolation\nTXT;\n")]
#[case::mixed_html("<html>\n<?php if ($a): ?>\n  <b><?= $a ?></b>\n<?php endif; ?>\n</html>\n")]
#[case::comments("<?php\n# hash\n// line\n/* block */\n/** doc */\nfunction f() {}\n")]
#[case::attributes("<?php\n#[Attr(1)]\nclass A { #[Pure] public function f(): static {} }\n")]
#[case::crlf("<?php\r\nclass A {}\r\n")]
#[case::unterminated("<?php\n$a = 'open")]
fn test_print_reproduces_input(#[case] source: &str) {
    assert_eq!(parse(source).print(), source);
}

#[rstest]
#[case(LEGACY_CHILD)]
#[case(NAMESPACED)]
fn test_tokens_cover_input(#[case] source: &str) {
    let joined: String = tokenize(source).iter().map(|token| token.text).collect();
    assert_eq!(joined, source);
}

#[test]
fn test_top_level_shapes() {
    let tree = parse(LEGACY_ADAPTER);
    let kinds: Vec<&NodeKind> = tree.children(tree.root()).iter().map(|&id| &tree.node(id).kind).collect();
    assert!(matches!(kinds[0], NodeKind::ClassLike { name, .. } if name == "Shop_Db_Adapter_Interface"));
    assert!(matches!(kinds[1], NodeKind::ClassLike { name, .. } if name == "Shop_Db_Adapter"));

    let tree = parse(NAMESPACED);
    let scopes = tree.scopes();
    assert_eq!(scopes.len(), 1);
    assert_eq!(scopes[0].namespace.as_deref(), Some("Shop\\Service"));
    assert_eq!(tree.scope_uses(&scopes[0]).len(), 1);
    assert!(tree.errors().is_empty());
}
