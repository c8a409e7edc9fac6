//! Hashing System - SHA-256 over canonical JSON
//!
//! Same definitions, same merge order, same hashes.

use sha2::{Sha256, Digest};
use serde::Serialize;
use serde_json::{Value, to_string};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    let sorted = sort_value(&v);
    to_string(&sorted)
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => {
            Value::Array(arr.iter().map(sort_value).collect())
        }
        _ => v.clone()
    }
}

/// Hash of one output document
pub fn compute_document_hash<T: Serialize>(document: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(document)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// content_hash = sha256(client_hash + server_hash + compiler_version)
///
/// Two runs agree on this exactly when they agree on both encodings.
pub fn compute_content_hash(client_hash: &str, server_hash: &str, compiler_version: &str) -> String {
    let combined = format!("{}:{}:{}", client_hash, server_hash, compiler_version);
    sha256_hex(combined.as_bytes())
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": 3});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn test_document_hash_ignores_key_order() {
        let a = json!({"blocks": [{"shape": 2, "top": 0}], "items": []});
        let b = json!({"items": [], "blocks": [{"top": 0, "shape": 2}]});
        assert_eq!(compute_document_hash(&a).unwrap(), compute_document_hash(&b).unwrap());
    }

    #[test]
    fn test_content_hash_depends_on_both_documents() {
        let h1 = compute_content_hash("aa", "bb", "1.0.0");
        assert_eq!(h1, compute_content_hash("aa", "bb", "1.0.0"));
        assert_ne!(h1, compute_content_hash("aa", "bc", "1.0.0"));
        assert_eq!(h1.len(), 64);
    }
}
