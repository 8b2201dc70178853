#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use psr4::planner::PlanErrorKind;
use psr4::project::{WalkOptions, plan_project};
use psr4::rewrite::{ConvertOptions, convert};

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_fixture::{TreeFixture, shop_config};

#[test]
fn test_converted_tree_plans_to_no_renames() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());
    assert!(result.renamed_count() > 0);

    let dest = fixture.path("dest");
    convert(&result, &dest, &ConvertOptions::default()).unwrap();

    let again = plan_project(&dest, &shop_config(), &WalkOptions::default()).unwrap();
    assert!(!again.has_errors(), "{:?}", again.files);
    assert_eq!(again.renamed_count(), 0);
    assert_eq!(again.decisions().count(), result.decisions().count());
}

#[test]
fn test_new_identities_are_unique() {
    let fixture = TreeFixture::shop();
    fixture.write("src/Shop/Model/Product/Extra.php", "<?php\nclass Shop_Model_Product_Extra {}\n");
    fixture.write("src/legacy.php", "<?php\nclass shop_model_base_legacy {}\nfunction SHOP_HELPER2() {}\n");
    let result = fixture.plan(&shop_config());

    let mut seen = HashSet::new();
    for (_, decision) in result.decisions() {
        for component in &decision.components {
            let kind = component.symbol_kind();
            assert!(
                seen.insert((kind, component.new.lookup_key(kind))),
                "{} assigned twice",
                component.new
            );
        }
    }
}

#[test]
fn test_converging_names_conflict_deterministically() {
    let fixture = TreeFixture::new();
    fixture.write("src/a.php", "<?php\nfunction helper() {}\n");
    fixture.write("src/b/one.php", "<?php\nfunction HELPER() {}\n");
    fixture.write("src/b/two.php", "<?php\nclass Foo_Bar {}\n");
    fixture.write("src/c.php", "<?php\nnamespace Foo;\nclass Bar {}\n");

    let first = fixture.plan(&shop_config());
    let second = fixture.plan(&shop_config());
    assert_eq!(first, second);

    let paths: Vec<&str> = first.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["a.php", "b/one.php", "b/two.php", "c.php"]);
    assert_eq!(first.files[0].decisions.len(), 1);
    assert_eq!(first.files[1].errors[0].kind, PlanErrorKind::Conflict);
    assert_eq!(first.files[2].decisions.len(), 1);
    assert!(first.files[3].decisions.is_empty());
    assert!(first.files[3].errors[0].message.contains("on file b/two.php"));
    assert_eq!(first.error_count(), 2);
}

#[test]
fn test_errors_never_carry_decisions() {
    let fixture = TreeFixture::shop();
    fixture.write("src/broken.php", INVALID);
    let result = fixture.plan(&shop_config());
    let broken = result.files.iter().find(|f| f.path == "broken.php").unwrap();
    assert!(broken.decisions.is_empty());
    assert!(result.index().lookup("Shop_Broken", psr4::SymbolKind::Type).is_none());
}
