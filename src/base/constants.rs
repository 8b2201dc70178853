//! Domain constants shared by the planner, the plan document and the CLI.

/// Extension of the source files the walker picks up
pub const PHP_EXTENSION: &str = "php";

/// File name used when a plan path points at a directory
pub const DEFAULT_PLAN_FILE: &str = ".psr4-migrate.map.json";

/// Default directory (relative to the destination) for shared include buckets
pub const DEFAULT_INCLUDES_DIR: &str = "includes";

/// Generated alias autoloader, written inside the includes directory
pub const AUTOLOAD_FILE: &str = "autoload.php";

/// Parser dialect marker stored in every plan document
pub const DIALECT: &str = "php8";

/// Key used to sign plan documents when the caller does not supply one
pub const DEFAULT_SIGNING_KEY: &[u8] = b"psr4-migrate plan signature v1";

/// Number of hex digits kept from the include bucket digest
pub const BUCKET_DIGEST_LEN: usize = 7;
