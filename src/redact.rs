//! Keeping credentials out of logs, telemetry and error banners.
//!
//! Two tools: a deny-list of field names whose values are replaced before a
//! structured payload is logged, and a pattern scan that spots credential
//! shapes inside free text such as exception messages.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Replacement for a sensitive value.
pub const MASKED_PLACEHOLDER: &str = "[MASKED]";

/// Field names whose values never reach a log line.
///
/// Matched exactly, ignoring ASCII case. This is a deny-list: a sensitive
/// field missing from it passes through untouched.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "access_token",
    "api_key",
    "app_secret",
    "auth_token",
    "client_secret",
    "password",
    "private_key",
    "refresh_token",
    "secret",
    "secret_key",
    "token",
    "verify_token",
    "webhook_secret",
];

fn credential_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"(?:sk|pk|rk)_(?:live|test)_[A-Za-z0-9]*",
            r"|rzp_(?:live|test)_[A-Za-z0-9]*",
            r"|whsec_[A-Za-z0-9]*",
            r"|EAA[A-Za-z0-9]{20,}",
            r"|eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+",
            r"|Bearer\s+[A-Za-z0-9._~+/-]{16,}=*",
            r"|[A-Za-z0-9]{32,}",
        ))
        .expect("credential pattern is valid")
    })
}

/// Returns `true` if `name` is on the sensitive field list.
pub fn is_sensitive_field(name: &str) -> bool {
    SENSITIVE_FIELDS
        .iter()
        .any(|field| field.eq_ignore_ascii_case(name))
}

/// Copies `fields`, replacing the value of every sensitive field with
/// [`MASKED_PLACEHOLDER`].
///
/// Only top-level names are checked; use [`sanitize_value`] for nested
/// payloads.
///
/// # Examples
///
/// ```
/// use commerce_client::sanitize_for_logging;
/// use serde_json::json;
///
/// let fields = json!({"secret_key": "sk_live_x", "note": "ok"});
/// let clean = sanitize_for_logging(fields.as_object().unwrap());
///
/// assert_eq!(serde_json::Value::Object(clean), json!({"secret_key": "[MASKED]", "note": "ok"}));
/// ```
pub fn sanitize_for_logging(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| {
            let value = if is_sensitive_field(name) {
                Value::String(MASKED_PLACEHOLDER.to_string())
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}

/// Recursive sanitization for arbitrary JSON.
///
/// Sensitive fields are masked at any depth, and string values that look
/// like credentials are passed through [`redact_message`].
pub fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(name, inner)| {
                    let inner = if is_sensitive_field(name) {
                        Value::String(MASKED_PLACEHOLDER.to_string())
                    } else {
                        sanitize_value(inner)
                    };
                    (name.clone(), inner)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        Value::String(s) => Value::String(redact_message(s)),
        other => other.clone(),
    }
}

/// Returns `true` if `text` contains something shaped like a credential.
///
/// Recognizes payment provider keys (`sk_live_…`, `pk_test_…`, `rzp_live_…`,
/// `whsec_…`), platform tokens (`EAA…`), JWTs, bearer headers, and any
/// alphanumeric run of 32 characters or more.
pub fn contains_credentials(text: &str) -> bool {
    credential_pattern().is_match(text)
}

/// Replaces every credential-shaped span in `text` with [`MASKED_PLACEHOLDER`].
///
/// Text without credentials is returned unchanged.
pub fn redact_message(text: &str) -> String {
    credential_pattern()
        .replace_all(text, MASKED_PLACEHOLDER)
        .into_owned()
}
