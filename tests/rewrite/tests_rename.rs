#![allow(clippy::unwrap_used)]

use psr4::project::{IdentityIndex, WalkOptions};
use psr4::rewrite::rename;

use crate::helpers::tree_fixture::{TreeFixture, shop_config};

const CONTROLLER: &str = r#"<?php
namespace App;

use Shop_Model_Product;

class Controller
{
    public function show(): Shop_Model_Product
    {
        return Shop_Model_Product::create();
    }
}
"#;

const SCRIPT: &str = r#"<?php
$product = new Shop_Model_Product(new Shop_Db_Adapter());
echo SHOP_LIMIT;
$class = 'Shop_Model_Base';
"#;

const UNRELATED: &str = "<?php\nnamespace App;\n\nclass Unrelated extends \\Vendor\\Base {}\n";

fn shop_index(fixture: &TreeFixture) -> IdentityIndex {
    fixture.plan(&shop_config()).index().clone()
}

#[test]
fn test_rename_imported_name_keeps_alias() {
    let fixture = TreeFixture::shop();
    fixture.write("app/Controller.php", CONTROLLER);

    let report = rename(&shop_index(&fixture), &[fixture.path("app")], &WalkOptions::default()).unwrap();
    assert_eq!(report.rewritten, vec![fixture.path("app/Controller.php")]);

    let controller = fixture.read("app/Controller.php");
    assert!(controller.contains("use Acme\\Shop\\Model\\Product as Shop_Model_Product;"), "{controller}");
    assert!(controller.contains("public function show(): Shop_Model_Product"));
    assert!(controller.contains("return Shop_Model_Product::create();"));
}

#[test]
fn test_rename_global_script() {
    let fixture = TreeFixture::shop();
    fixture.write("legacy/script.php", SCRIPT);

    let report = rename(&shop_index(&fixture), &[fixture.path("legacy")], &WalkOptions::default()).unwrap();
    assert_eq!(report.substituted, 2);

    let script = fixture.read("legacy/script.php");
    assert!(script.starts_with("<?php\n\nuse Acme\\Shop\\Db\\Adapter;\nuse Acme\\Shop\\Model\\Product;\n\n"), "{script}");
    assert!(script.contains("$product = new Product(new Adapter());"));
    assert!(script.contains("echo SHOP_LIMIT;"));

    assert_eq!(report.review.len(), 1);
    assert_eq!(report.review[0].path.as_deref(), Some("script.php"));
    assert_eq!(report.review[0].line, 4);
    assert_eq!(report.review[0].suggestion, "\\Acme\\Shop\\Model\\Base");
}

#[test]
fn test_rename_leaves_unrelated_files_alone() {
    let fixture = TreeFixture::shop();
    fixture.write("app/Unrelated.php", UNRELATED);
    fixture.write("app/Controller.php", CONTROLLER);

    let report = rename(&shop_index(&fixture), &[fixture.path("app")], &WalkOptions::default()).unwrap();
    assert_eq!(report.rewritten.len(), 1);
    assert_eq!(fixture.read("app/Unrelated.php"), UNRELATED);
}

#[test]
fn test_rename_with_merged_plans() {
    let fixture = TreeFixture::shop();
    let billing = TreeFixture::new();
    billing.write("src/Billing/Invoice.php", "<?php\nclass Billing_Invoice {}\n");
    fixture.write(
        "app/Service.php",
        "<?php\nnamespace App;\n\nclass Service extends \\Billing_Invoice implements \\Shop_Db_Adapter_Interface {}\n",
    );

    let mut index = shop_index(&fixture);
    index.merge(billing.plan(&shop_config()).index());

    let report = rename(&index, &[fixture.path("app")], &WalkOptions::default()).unwrap();
    assert_eq!(report.substituted, 2);
    let service = fixture.read("app/Service.php");
    assert!(service.contains("use Acme\\Billing\\Invoice;"), "{service}");
    assert!(service.contains("use Acme\\Shop\\Db\\Adapter\\AdapterInterface;"));
    assert!(service.contains("class Service extends Invoice implements AdapterInterface {}"));
}

#[test]
fn test_rename_across_several_directories() {
    let fixture = TreeFixture::shop();
    fixture.write("app/Controller.php", CONTROLLER);
    fixture.write("legacy/script.php", SCRIPT);

    let report = rename(
        &shop_index(&fixture),
        &[fixture.path("app"), fixture.path("legacy")],
        &WalkOptions::default(),
    )
    .unwrap();
    assert_eq!(report.rewritten.len(), 2);
}
