//! Content hashes and plan signatures
//!
//! A persisted plan is the canonical JSON encoding of the [`ProjectResult`]
//! (object keys sorted at every level) with a `signature` field holding the
//! HMAC-SHA256 of that encoding without the signature itself.

use std::path::Path;

use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::error::IntegrityError;
use super::result::ProjectResult;
use crate::base::constants::DIALECT;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_FIELD: &str = "signature";

/// sha256 hex of a file's bytes
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Sort object keys recursively
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

fn mac_hex(key: &[u8], bytes: &[u8]) -> Result<String, IntegrityError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| IntegrityError::InvalidKey)?;
    mac.update(bytes);
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

/// Keyed digest over the canonical encoding, `signature` field excluded
pub fn sign_value(value: &Value, key: &[u8]) -> Result<String, IntegrityError> {
    let mut unsigned = canonicalize(value);
    if let Value::Object(map) = &mut unsigned {
        map.remove(SIGNATURE_FIELD);
    }
    let bytes = serde_json::to_vec(&unsigned)?;
    mac_hex(key, &bytes)
}

pub fn sign(result: &ProjectResult, key: &[u8]) -> Result<String, IntegrityError> {
    sign_value(&serde_json::to_value(result)?, key)
}

/// Canonical signed encoding of a result
pub fn to_signed_bytes(result: &ProjectResult, key: &[u8]) -> Result<Vec<u8>, IntegrityError> {
    let value = serde_json::to_value(result)?;
    let signature = sign_value(&value, key)?;
    let mut signed = canonicalize(&value);
    if let Value::Object(map) = &mut signed {
        map.insert(SIGNATURE_FIELD.to_string(), Value::String(signature));
    }
    let mut bytes = serde_json::to_vec(&canonicalize(&signed))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Check the signature and the encoding of a persisted plan.
///
/// The bytes must be exactly the canonical encoding, so any edit made
/// outside [`to_signed_bytes`] is rejected.
pub fn verify_signature(bytes: &[u8], key: &[u8]) -> Result<ProjectResult, IntegrityError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Some(Value::String(signature)) = value.get(SIGNATURE_FIELD) else {
        return Err(IntegrityError::MissingSignature);
    };

    let expected = sign_value(&value, key)?;
    let canonical = serde_json::to_vec(&canonicalize(&value))?;
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    if *signature != expected || canonical != body {
        return Err(IntegrityError::Tampered);
    }

    let mut result: ProjectResult = serde_json::from_value(value)?;
    if result.dialect != DIALECT {
        return Err(IntegrityError::Dialect {
            found: result.dialect,
            expected: DIALECT.to_string(),
        });
    }
    result.reindex();
    Ok(result)
}

/// Recompute every file hash against the current source tree
pub fn verify_content_hashes(result: &ProjectResult) -> Result<(), IntegrityError> {
    verify_hashes(result, false)
}

/// Like [`verify_content_hashes`], skipping planned files no longer on disk
pub fn verify_existing_content_hashes(result: &ProjectResult) -> Result<(), IntegrityError> {
    verify_hashes(result, true)
}

fn verify_hashes(result: &ProjectResult, skip_missing: bool) -> Result<(), IntegrityError> {
    let root = Path::new(&result.source_root);
    let mut checked = 0;
    for file in &result.files {
        let bytes = match std::fs::read(root.join(&file.path)) {
            Ok(bytes) => bytes,
            Err(e) if skip_missing && e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(IntegrityError::Unreadable {
                    path: file.path.clone(),
                    source,
                });
            }
        };
        if content_hash(&bytes) != file.hash {
            return Err(IntegrityError::Stale { path: file.path.clone() });
        }
        checked += 1;
    }
    debug!(files = checked, "content hashes verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{PlannerConfig, plan_file};
    use serde_json::json;
    use tempfile::TempDir;

    const KEY: &[u8] = b"test key";

    fn result(root: &str) -> ProjectResult {
        let config = PlannerConfig::new("Acme");
        let files = vec![plan_file("a.php", "<?php\nclass A {}\n", &config)];
        ProjectResult::new(root, &config, files)
    }

    #[test]
    fn test_content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_canonicalize_sorts_nested_keys() {
        let value = json!({"b": {"z": 1, "a": [{"y": 2, "x": 3}]}, "a": null});
        let text = serde_json::to_string(&canonicalize(&value)).unwrap();
        assert_eq!(text, r#"{"a":null,"b":{"a":[{"x":3,"y":2}],"z":1}}"#);
    }

    #[test]
    fn test_signed_round_trip() {
        let original = result("/src");
        let bytes = to_signed_bytes(&original, KEY).unwrap();
        let loaded = verify_signature(&bytes, KEY).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_any_mutation_is_tampering() {
        let bytes = to_signed_bytes(&result("/src"), KEY).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();

        let renamed = text.replace("Acme", "Acmf");
        assert!(matches!(verify_signature(renamed.as_bytes(), KEY), Err(IntegrityError::Tampered)));

        let spaced = text.replacen(':', ": ", 1);
        assert!(matches!(verify_signature(spaced.as_bytes(), KEY), Err(IntegrityError::Tampered)));

        assert!(matches!(verify_signature(&bytes, b"other key"), Err(IntegrityError::Tampered)));
        assert!(matches!(verify_signature(b"{}", KEY), Err(IntegrityError::MissingSignature)));
        assert!(matches!(verify_signature(b"{", KEY), Err(IntegrityError::Malformed(_))));
    }

    #[test]
    fn test_stale_source_detected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.php"), "<?php\nclass A {}\n").unwrap();
        let result = result(dir.path().to_str().unwrap());
        assert!(verify_content_hashes(&result).is_ok());

        std::fs::write(dir.path().join("a.php"), "<?php\nclass B {}\n").unwrap();
        assert!(matches!(verify_content_hashes(&result), Err(IntegrityError::Stale { path }) if path == "a.php"));

        std::fs::remove_file(dir.path().join("a.php")).unwrap();
        assert!(matches!(verify_content_hashes(&result), Err(IntegrityError::Unreadable { .. })));
        assert!(verify_existing_content_hashes(&result).is_ok());
    }

    #[test]
    fn test_existing_hashes_still_catch_stale_sources() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.php"), "<?php\nclass B {}\n").unwrap();
        let result = result(dir.path().to_str().unwrap());
        assert!(matches!(
            verify_existing_content_hashes(&result),
            Err(IntegrityError::Stale { path }) if path == "a.php"
        ));
    }
}
