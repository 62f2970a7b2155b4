// mask.rs — Sensitive-field masking for event metadata.
//
// Audit records outlive the request and are read by humans; credential
// material must never land in them verbatim. Masking keeps the leading
// and trailing two characters of longer values so records remain
// correlatable without being usable.

use serde_json::{Map, Value};

/// Metadata keys whose values are masked (substring match, lowercased).
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "passwd",
    "pwd",
    "api_key",
    "apikey",
    "token",
    "secret",
    "private_key",
    "credit_card",
    "card_number",
    "ssn",
];

/// Recursively mask sensitive fields in a JSON value.
///
/// Objects are walked; any entry whose key contains a sensitive keyword
/// has its value replaced. Non-object values pass through unchanged.
pub fn mask_sensitive(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut masked = Map::with_capacity(map.len());
            for (key, item) in map {
                let key_lower = key.to_lowercase();
                if SENSITIVE_KEYS.iter().any(|k| key_lower.contains(k)) {
                    masked.insert(key.clone(), Value::String(mask_value(item)));
                } else {
                    masked.insert(key.clone(), mask_sensitive(item));
                }
            }
            Value::Object(masked)
        }
        Value::Array(items) => Value::Array(items.iter().map(mask_sensitive).collect()),
        other => other.clone(),
    }
}

fn mask_value(value: &Value) -> String {
    match value {
        // Edge-keeping only for ASCII; slicing multibyte text mid-char panics.
        Value::String(s) if s.is_ascii() && s.len() > 4 => {
            format!("{}{}{}", &s[..2], "*".repeat(s.len() - 4), &s[s.len() - 2..])
        }
        _ => "***MASKED***".to_string(),
    }
}
