#![allow(clippy::unwrap_used)]

use std::fs;

use psr4::ProjectResult;
use psr4::planner::DeclarationKind;
use psr4::rewrite::{ConvertOptions, RewriteError, convert};

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_fixture::{TreeFixture, shop_config};

fn bucket_target(result: &ProjectResult) -> String {
    result
        .decisions()
        .find(|(_, decision)| decision.kind == DeclarationKind::Function)
        .map(|(_, decision)| decision.target.clone())
        .unwrap()
}

#[test]
fn test_convert_shop_layout() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());
    let report = convert(&result, &fixture.path("dest"), &ConvertOptions::default()).unwrap();

    for target in [
        "dest/Acme/Shop/Model/Base.php",
        "dest/Acme/Shop/Model/Product.php",
        "dest/Acme/Shop/Db/Adapter.php",
        "dest/Acme/Shop/Db/Adapter/AdapterInterface.php",
    ] {
        assert!(fixture.exists(target), "{target} missing");
    }
    assert_eq!(report.written.len(), 5);
    assert_eq!(report.aliases, 0);
    assert!(!fixture.exists("dest/includes/autoload.php"));
}

#[test]
fn test_converted_child_class() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());
    convert(&result, &fixture.path("dest"), &ConvertOptions::default()).unwrap();

    let product = fixture.read("dest/Acme/Shop/Model/Product.php");
    assert!(
        product.starts_with("<?php\n\nnamespace Acme\\Shop\\Model;\n\nuse Acme\\Shop\\Db\\Adapter;\nuse Countable;\n\nclass Product"),
        "{product}"
    );
    assert!(product.contains("class Product extends Base implements Countable\n{"));
    assert!(product.contains("return \\shop_helper(\\SHOP_LIMIT);"));
    assert!(product.contains("public static function create(): self"));
    assert!(product.contains("return new Product(new Adapter());"));
    assert!(product.ends_with("}\n"));
}

#[test]
fn test_converted_docblocks_follow_imports() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());
    convert(&result, &fixture.path("dest"), &ConvertOptions::default()).unwrap();

    let base = fixture.read("dest/Acme/Shop/Model/Base.php");
    assert!(base.contains("use Acme\\Shop\\Db\\Adapter;"));
    assert!(base.contains("/**\n * Base model\n */\nabstract class Base"));
    assert!(base.contains("/** @var Adapter */"));
    assert!(base.contains("public function __construct(Adapter $db)"));
}

#[test]
fn test_string_literals_are_reported() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());
    let report = convert(&result, &fixture.path("dest"), &ConvertOptions::default()).unwrap();

    let adapter = fixture.read("dest/Acme/Shop/Db/Adapter.php");
    assert!(adapter.contains("use Acme\\Shop\\Db\\Adapter\\AdapterInterface;"));
    assert!(adapter.contains("class Adapter implements AdapterInterface"));
    assert!(adapter.contains("return 'Shop_Db_Adapter';"));

    assert_eq!(report.review.len(), 1);
    let item = &report.review[0];
    assert_eq!(item.path.as_deref(), Some("Shop/Db/Adapter.php"));
    assert_eq!(item.line, 8);
    assert_eq!(item.suggestion, "\\Acme\\Shop\\Db\\Adapter");
}

#[test]
fn test_functions_land_in_bucket() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());
    convert(&result, &fixture.path("dest"), &ConvertOptions::default()).unwrap();

    let buckets: Vec<String> = fs::read_dir(fixture.path("dest/includes"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(buckets.len(), 1);
    assert!(buckets[0].starts_with("include.") && buckets[0].ends_with(".php"));
    assert_eq!(format!("includes/{}", buckets[0]), bucket_target(&result));

    let bucket = fixture.read(&format!("dest/includes/{}", buckets[0]));
    assert!(bucket.starts_with("<?php\n"));
    assert!(!bucket.contains("namespace"));
    assert!(bucket.contains("const SHOP_LIMIT = 10;"));
    assert!(bucket.contains("function shop_helper($limit)"));
}

#[test]
fn test_aliases_keep_old_names_loadable() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());
    let options = ConvertOptions {
        create_aliases: true,
        ..ConvertOptions::default()
    };
    let report = convert(&result, &fixture.path("dest"), &options).unwrap();
    assert_eq!(report.aliases, 4);

    let product = fixture.read("dest/Acme/Shop/Model/Product.php");
    assert!(product.contains("\\class_alias('Acme\\Shop\\Model\\Product', 'Shop_Model_Product', false);"));

    let autoload = fixture.read("dest/includes/autoload.php");
    assert!(autoload.contains("'shop_model_base' => 'Acme\\Shop\\Model\\Base',"));
    assert!(autoload.contains("'shop_db_adapter_interface' => 'Acme\\Shop\\Db\\Adapter\\AdapterInterface',"));
    assert!(autoload.find("'shop_db_adapter'").unwrap() < autoload.find("'shop_model_base'").unwrap());
}

#[test]
fn test_strip_prefix_path() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());
    let options = ConvertOptions {
        strip_prefix_path: true,
        ..ConvertOptions::default()
    };
    convert(&result, &fixture.path("dest"), &options).unwrap();

    assert!(fixture.exists("dest/Shop/Model/Product.php"));
    assert!(!fixture.exists("dest/Acme"));
    assert!(fixture.exists(&format!("dest/{}", bucket_target(&result))));
    assert!(fixture.read("dest/Shop/Model/Product.php").contains("namespace Acme\\Shop\\Model;"));
}

#[test]
fn test_risky_plan_needs_consent() {
    let fixture = TreeFixture::shop();
    fixture.write("src/polyfill.php", LEGACY_CONDITIONAL);
    let result = fixture.plan(&shop_config());

    let err = convert(&result, &fixture.path("dest"), &ConvertOptions::default()).unwrap_err();
    assert!(matches!(&err, RewriteError::Risky { files } if files == &vec!["polyfill.php".to_string()]));
    assert!(!fixture.exists("dest"));

    let options = ConvertOptions {
        allow_risky: true,
        ..ConvertOptions::default()
    };
    let report = convert(&result, &fixture.path("dest"), &options).unwrap();
    assert_eq!(report.written.len(), 6);
}

#[test]
fn test_existing_bucket_is_merged() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());
    let target = bucket_target(&result);
    fixture.write(&format!("dest/{target}"), "<?php\n\nfunction shop_extra()\n{\n    return 1;\n}\n");

    convert(&result, &fixture.path("dest"), &ConvertOptions::default()).unwrap();
    let bucket = fixture.read(&format!("dest/{target}"));
    let extra = bucket.find("function shop_extra()").unwrap();
    let helper = bucket.find("function shop_helper($limit)").unwrap();
    assert!(extra < helper);
    assert!(bucket.contains("const SHOP_LIMIT = 10;"));
}

#[test]
fn test_existing_bucket_in_other_namespace_aborts() {
    let fixture = TreeFixture::shop();
    let result = fixture.plan(&shop_config());
    let target = bucket_target(&result);
    fixture.write(&format!("dest/{target}"), "<?php\n\nnamespace Vendor;\n\nfunction other() {}\n");

    let err = convert(&result, &fixture.path("dest"), &ConvertOptions::default()).unwrap_err();
    assert!(matches!(&err, RewriteError::IncompatibleMerge { target: t, .. } if t == &target), "{err:?}");
    assert_eq!(
        fixture.read(&format!("dest/{target}")),
        "<?php\n\nnamespace Vendor;\n\nfunction other() {}\n"
    );
}

#[test]
fn test_namespaced_source_keeps_directives() {
    let fixture = TreeFixture::new();
    fixture.write("src/Shop/Service/Checkout.php", NAMESPACED);
    let result = fixture.plan(&shop_config());
    convert(&result, &fixture.path("dest"), &ConvertOptions::default()).unwrap();

    let checkout = fixture.read("dest/Acme/Shop/Service/Checkout.php");
    assert!(checkout.starts_with("<?php\n\ndeclare(strict_types=1);\n\nnamespace Acme\\Shop\\Service;\n\nuse Psr\\Log\\LoggerInterface;\n"));
    assert!(checkout.contains("final class Checkout"));
    assert!(checkout.contains("private LoggerInterface $logger"));
}
