//! Usage: Security-sensitive helpers (token masking for logs and constant-time state comparison).

use serde_json::Value;
use subtle::ConstantTimeEq;

const TOKEN_MASK_PREFIX_LEN: usize = 6;
const TOKEN_MASK_SUFFIX_LEN: usize = 4;

pub(crate) fn mask_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let len = trimmed.len();
    if len <= TOKEN_MASK_PREFIX_LEN + TOKEN_MASK_SUFFIX_LEN || !trimmed.is_ascii() {
        return "*".repeat(trimmed.chars().count().min(8));
    }

    let prefix = &trimmed[..TOKEN_MASK_PREFIX_LEN];
    let suffix = &trimmed[len - TOKEN_MASK_SUFFIX_LEN..];
    format!("{prefix}...{suffix}")
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

const LOG_BODY_MAX_CHARS: usize = 500;

fn is_sensitive_key(key: &str) -> bool {
    let key_lc = key.trim().to_ascii_lowercase();
    key_lc.contains("token")
        || key_lc.contains("password")
        || key_lc.contains("secret")
        || key_lc == "login_url"
        || key_lc == "code"
}

fn redact_sensitive_json_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if is_sensitive_key(key) {
                    if let Some(raw) = nested.as_str() {
                        *nested = Value::String(mask_token(raw));
                        continue;
                    }
                }
                redact_sensitive_json_fields(nested);
            }
        }
        Value::Array(items) => {
            for nested in items {
                redact_sensitive_json_fields(nested);
            }
        }
        _ => {}
    }
}

/// Body snippet safe for debug logs: JSON string fields holding credentials are masked.
pub(crate) fn redact_body_for_log(body: &str) -> String {
    if let Ok(mut value) = serde_json::from_str::<Value>(body) {
        redact_sensitive_json_fields(&mut value);
        if let Ok(encoded) = serde_json::to_string(&value) {
            return encoded.chars().take(LOG_BODY_MAX_CHARS).collect();
        }
    }
    body.chars().take(LOG_BODY_MAX_CHARS).collect()
}
