//! Session identifiers and device fingerprints for short tokens.

use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A fresh random session identifier.
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Deterministic fingerprint of client-supplied device metadata.
///
/// Object keys are sorted before hashing, so the same metadata always yields
/// the same fingerprint regardless of key order.
pub fn device_fingerprint(device: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical(device).as_bytes());
    hex::encode(hasher.finalize())
}

fn canonical(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let body = entries
                .into_iter()
                .map(|(key, value)| format!("{}:{}", Value::from(key.as_str()), canonical(value)))
                .collect::<Vec<_>>()
                .join(",");
            format!("{{{}}}", body)
        }
        Value::Array(items) => {
            let body = items.iter().map(canonical).collect::<Vec<_>>().join(",");
            format!("[{}]", body)
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let device = json!({ "ip": "10.0.0.1", "agent": "curl/8.0" });
        assert_eq!(device_fingerprint(&device), device_fingerprint(&device));
        assert_eq!(device_fingerprint(&device).len(), 64);
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let a: Value = serde_json::from_str(r#"{"ip":"10.0.0.1","agent":"curl/8.0"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"agent":"curl/8.0","ip":"10.0.0.1"}"#).unwrap();
        assert_eq!(device_fingerprint(&a), device_fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_differs_per_device() {
        let a = json!({ "ip": "10.0.0.1", "agent": "curl/8.0" });
        let b = json!({ "ip": "10.0.0.2", "agent": "curl/8.0" });
        assert_ne!(device_fingerprint(&a), device_fingerprint(&b));
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(new_session_id(), new_session_id());
    }
}
