//! Common PHP sources for tests.
#![allow(dead_code)]

pub const LEGACY_CLASS: &str = r#"<?php
/**
 * Base model
 */
abstract class Shop_Model_Base
{
    /** @var Shop_Db_Adapter */
    protected $db;

    public function __construct(Shop_Db_Adapter $db)
    {
        $this->db = $db;
    }
}
"#;

pub const LEGACY_CHILD: &str = r#"<?php
class Shop_Model_Product extends Shop_Model_Base implements Countable
{
    public function count(): int
    {
        return shop_helper(SHOP_LIMIT);
    }

    public static function create(): self
    {
        return new Shop_Model_Product(new Shop_Db_Adapter());
    }
}
"#;

pub const LEGACY_ADAPTER: &str = r#"<?php
interface Shop_Db_Adapter_Interface {}

class Shop_Db_Adapter implements Shop_Db_Adapter_Interface
{
    public function name()
    {
        return 'Shop_Db_Adapter';
    }
}
"#;

pub const LEGACY_FUNCTIONS: &str = r#"<?php
const SHOP_LIMIT = 10;

function shop_helper($limit)
{
    return $limit * 2;
}
"#;

pub const LEGACY_CONDITIONAL: &str = r#"<?php
if (!function_exists('shop_polyfill')) {
    function shop_polyfill()
    {
        return null;
    }
}
"#;

pub const NAMESPACED: &str = r#"<?php
declare(strict_types=1);

namespace Shop\Service;

use Psr\Log\LoggerInterface;

final class Checkout
{
    public function __construct(private LoggerInterface $logger) {}
}
"#;

pub const INVALID: &str = r#"<?php
class Shop_Broken {}

echo 'side effect';
"#;
