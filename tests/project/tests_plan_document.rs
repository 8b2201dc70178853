#![allow(clippy::unwrap_used)]

use std::fs;

use psr4::base::constants::DEFAULT_PLAN_FILE;
use psr4::project::{IntegrityError, ProjectError, load_plan, save_plan};
use psr4::rewrite::{ConvertOptions, RewriteError, convert};

use crate::helpers::tree_fixture::{TreeFixture, shop_config};

const KEY: &[u8] = b"integration key";

#[test]
fn test_saved_plan_loads_back() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());

    let written = save_plan(&result, fixture.root(), KEY).unwrap();
    assert_eq!(written, fixture.root().join(DEFAULT_PLAN_FILE));

    let loaded = load_plan(&written, KEY).unwrap();
    assert_eq!(loaded, result);
    assert_eq!(loaded.index().len(), result.index().len());
    assert!(loaded.index().lookup("Shop_Model_Base", psr4::SymbolKind::Type).is_some());
}

#[test]
fn test_plan_document_is_compact_canonical_json() {
    let fixture = TreeFixture::shop();
    let written = save_plan(&fixture.plan(&shop_config()), fixture.root(), KEY).unwrap();
    let text = fs::read_to_string(written).unwrap();
    assert!(text.starts_with("{\"dialect\":\"php8\","));
    assert!(text.ends_with("}\n"));
    assert_eq!(text.lines().count(), 1);
    assert!(text.contains("\"signature\":\""));
}

#[test]
fn test_edited_plan_is_rejected() {
    let fixture = TreeFixture::shop();
    let written = save_plan(&fixture.plan(&shop_config()), fixture.root(), KEY).unwrap();
    let text = fs::read_to_string(&written).unwrap();

    fs::write(&written, text.replace("Acme/Shop/Model/Base.php", "Acme/Shop/Model/Other.php")).unwrap();
    assert!(matches!(
        load_plan(&written, KEY),
        Err(ProjectError::Integrity(IntegrityError::Tampered))
    ));

    fs::write(&written, &text[..text.len() / 2]).unwrap();
    assert!(matches!(
        load_plan(&written, KEY),
        Err(ProjectError::Integrity(IntegrityError::Malformed(_)))
    ));
}

#[test]
fn test_wrong_key_is_rejected() {
    let fixture = TreeFixture::shop();
    let written = save_plan(&fixture.plan(&shop_config()), fixture.root(), KEY).unwrap();
    assert!(matches!(
        load_plan(&written, b"another key"),
        Err(ProjectError::Integrity(IntegrityError::Tampered))
    ));
}

#[test]
fn test_changed_source_makes_plan_stale() {
    let fixture = TreeFixture::shop();
    let written = save_plan(&fixture.plan(&shop_config()), fixture.root(), KEY).unwrap();
    fixture.write("src/Shop/Model/Base.php", "<?php\nabstract class Shop_Model_Base {}\n");

    let loaded = load_plan(&written, KEY).unwrap();
    let dest = fixture.path("dest");
    let err = convert(&loaded, &dest, &ConvertOptions::default()).unwrap_err();
    assert!(
        matches!(&err, RewriteError::Integrity(IntegrityError::Stale { path }) if path == "Shop/Model/Base.php"),
        "{err:?}"
    );
    assert!(!dest.exists());
}
