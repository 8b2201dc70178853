#![allow(clippy::unwrap_used)]

use rstest::rstest;

use psr4::planner::{DeclarationKind, IgnoreRule, MappingDecision, PlanErrorKind, PlannerConfig, plan_file};

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_fixture::shop_config;

fn decisions(source: &str, config: &PlannerConfig) -> Vec<MappingDecision> {
    let plan = plan_file("a.php", source, config);
    assert!(plan.errors.is_empty(), "{:?}", plan.errors);
    plan.decisions
}

#[rstest]
#[case::plain("<?php\nclass Foo_Bar {}\n", "Acme\\Foo\\Bar", "Acme/Foo/Bar.php")]
#[case::interface("<?php\ninterface Foo_Bar_Interface {}\n", "Acme\\Foo\\Bar\\BarInterface", "Acme/Foo/Bar/BarInterface.php")]
#[case::lowercase("<?php\ntrait foo_bar {}\n", "Acme\\Foo\\Bar", "Acme/Foo/Bar.php")]
#[case::namespaced("<?php\nnamespace Shop;\nclass Cart {}\n", "Acme\\Shop\\Cart", "Acme/Shop/Cart.php")]
fn test_type_identity_and_target(#[case] source: &str, #[case] new: &str, #[case] target: &str) {
    let decision = decisions(source, &shop_config()).remove(0);
    assert_eq!(decision.components[0].new.as_str(), new);
    assert_eq!(decision.target, target);
    assert!(decision.exclusive);
}

#[test]
fn test_legacy_adapter_file() {
    let decisions = decisions(LEGACY_ADAPTER, &shop_config());
    let names: Vec<&str> = decisions.iter().map(|d| d.components[0].new.as_str()).collect();
    assert_eq!(names, vec!["Acme\\Shop\\Db\\Adapter\\AdapterInterface", "Acme\\Shop\\Db\\Adapter"]);
    assert_eq!(decisions[0].kind, DeclarationKind::Interface);
    assert_eq!(decisions[1].span.start_line, 4);
    assert_eq!(decisions[1].span.end_line, 10);
    assert!(decisions.iter().all(|d| !d.risky));
}

#[test]
fn test_functions_share_one_bucket() {
    let decisions = decisions(LEGACY_FUNCTIONS, &shop_config());
    assert_eq!(decisions.len(), 2);
    assert_eq!(decisions[0].kind, DeclarationKind::Constant);
    assert_eq!(decisions[1].kind, DeclarationKind::Function);
    assert_eq!(decisions[0].target, decisions[1].target);
    assert!(decisions[0].target.starts_with("includes/include."));
    assert!(decisions.iter().all(|d| !d.exclusive && !d.is_renamed()));
}

#[test]
fn test_conditional_declaration_is_risky() {
    let conditional = decisions(LEGACY_CONDITIONAL, &shop_config()).remove(0);
    let plain = decisions(LEGACY_FUNCTIONS, &shop_config()).remove(0);
    assert!(conditional.is_conditional());
    assert!(conditional.risky);
    assert!(!conditional.exclusive);
    assert_ne!(conditional.target, plain.target);
}

#[test]
fn test_includes_dir_changes_bucket_paths() {
    let config = PlannerConfig {
        includes_dir: "lib/shared".into(),
        ..shop_config()
    };
    let decision = decisions(LEGACY_FUNCTIONS, &config).remove(0);
    assert!(decision.target.starts_with("lib/shared/include."));
}

#[rstest]
#[case::named("Shop\\Service", true)]
#[case::every_namespace("*", true)]
#[case::global_only("?", false)]
#[case::other("Vendor", false)]
fn test_ignore_rules_on_namespaced_file(#[case] rule: &str, #[case] kept: bool) {
    let config = PlannerConfig {
        ignore_namespaces: vec![rule.parse::<IgnoreRule>().unwrap()],
        ..shop_config()
    };
    let decision = decisions(NAMESPACED, &config).remove(0);
    assert_eq!(decision.ignored, kept);
    assert_eq!(decision.is_renamed(), !kept);
    assert_eq!(decision.directives.len(), 1);
}

#[test]
fn test_invalid_statement_rejects_file() {
    let plan = plan_file("broken.php", INVALID, &shop_config());
    assert!(plan.decisions.is_empty());
    assert!(plan.has_errors());
    assert!(plan.errors.iter().all(|e| e.kind == PlanErrorKind::InvalidStatement));
    assert_eq!(plan.errors[0].span.as_ref().unwrap().start_line, 4);
}

#[test]
fn test_syntax_error_rejects_file() {
    let plan = plan_file("broken.php", "<?php\nclass Foo {\n", &shop_config());
    assert!(plan.decisions.is_empty());
    assert!(plan.errors.iter().all(|e| e.kind == PlanErrorKind::Syntax));
}

#[test]
fn test_plan_file_is_deterministic() {
    let first = plan_file("a.php", LEGACY_CHILD, &shop_config());
    let second = plan_file("a.php", LEGACY_CHILD, &shop_config());
    assert_eq!(first, second);
    assert_eq!(first.hash.len(), 64);
}
