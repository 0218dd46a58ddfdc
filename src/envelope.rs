//! The `{ ok, data | error, timestamp }` wrapper every backend response uses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transport::RawResponse;

/// Error half of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable code (e.g. `AUTHORIZATION_FAILED`)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Optional structured details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// The response envelope.
///
/// `ok` discriminates which of `data` and `error` is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T = Value> {
    /// Whether the call succeeded
    pub ok: bool,
    /// Payload on success
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Error on failure
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
    /// Server timestamp
    #[serde(default)]
    pub timestamp: String,
}

impl<T> ApiEnvelope<T> {
    /// Converts the envelope into a `Result`, honoring `ok`.
    pub fn into_result(self) -> Result<Option<T>, ApiErrorBody> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(|| ApiErrorBody {
                code: "UNKNOWN".to_string(),
                message: "request failed".to_string(),
                details: None,
            }))
        }
    }
}

/// Picks the most specific server message out of an error body.
///
/// Checks `error.message`, then `detail` (a string, or the first entry's
/// `msg` when the server sent a validation list), then `message`.
pub fn extract_error_message(body: &Value) -> Option<String> {
    let from_envelope = body
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str);

    let from_detail = || match body.get("detail") {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(Value::Array(items)) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str),
        _ => None,
    };

    let from_message = || body.get("message").and_then(Value::as_str);

    from_envelope
        .or_else(from_detail)
        .or_else(from_message)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// Error code from `error.code`, or a top-level `code`.
pub fn extract_error_code(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(|e| e.get("code"))
        .or_else(|| body.get("code"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Parses the body as JSON when the server says it is JSON.
pub fn parse_json_body(raw: &RawResponse) -> Option<Value> {
    if !raw.is_json() || raw.body.is_empty() {
        return None;
    }
    serde_json::from_slice(&raw.body).ok()
}

/// Normalizes a successful response.
///
/// - JSON object carrying a `data` key: returns `data` exactly.
/// - Other JSON: returned as parsed.
/// - Anything else: the raw text as a JSON string, unmodified.
/// - Empty body: `null`.
pub fn unwrap_success(raw: &RawResponse) -> Value {
    if raw.body.is_empty() {
        return Value::Null;
    }

    match parse_json_body(raw) {
        Some(Value::Object(mut map)) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        Some(value) => value,
        None => Value::String(String::from_utf8_lossy(&raw.body).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_deserializes_success() {
        let env: ApiEnvelope = serde_json::from_value(json!({
            "ok": true,
            "data": {"id": 7},
            "timestamp": "2026-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(env.into_result().unwrap(), Some(json!({"id": 7})));
    }

    #[test]
    fn envelope_deserializes_failure() {
        let env: ApiEnvelope = serde_json::from_value(json!({
            "ok": false,
            "error": {"code": "NOT_FOUND", "message": "Product not found"},
            "timestamp": "2026-01-01T00:00:00Z"
        }))
        .unwrap();

        let err = env.into_result().unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.message, "Product not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn failed_envelope_without_error_gets_generic_body() {
        let env: ApiEnvelope = serde_json::from_value(json!({"ok": false})).unwrap();
        assert_eq!(env.into_result().unwrap_err().code, "UNKNOWN");
    }

    #[test]
    fn message_prefers_envelope_error() {
        let body = json!({
            "error": {"message": "from envelope"},
            "detail": "from detail",
            "message": "from message"
        });
        assert_eq!(extract_error_message(&body).as_deref(), Some("from envelope"));
    }

    #[test]
    fn message_falls_back_to_detail_then_message() {
        assert_eq!(
            extract_error_message(&json!({"detail": "Not authenticated"})).as_deref(),
            Some("Not authenticated")
        );
        assert_eq!(
            extract_error_message(&json!({"message": "Too many requests"})).as_deref(),
            Some("Too many requests")
        );
    }

    #[test]
    fn message_reads_validation_list_detail() {
        let body = json!({"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email"}]});
        assert_eq!(
            extract_error_message(&body).as_deref(),
            Some("value is not a valid email")
        );
    }

    #[test]
    fn message_absent_or_blank_is_none() {
        assert!(extract_error_message(&json!({"foo": "bar"})).is_none());
        assert!(extract_error_message(&json!({"message": "  "})).is_none());
        assert!(extract_error_message(&json!("plain")).is_none());
    }

    #[test]
    fn code_from_envelope_or_top_level() {
        assert_eq!(
            extract_error_code(&json!({"error": {"code": "AUTHORIZATION_FAILED"}})).as_deref(),
            Some("AUTHORIZATION_FAILED")
        );
        assert_eq!(
            extract_error_code(&json!({"code": "RATE_LIMITED"})).as_deref(),
            Some("RATE_LIMITED")
        );
        assert!(extract_error_code(&json!({})).is_none());
    }

    #[test]
    fn unwrap_returns_data_exactly() {
        let raw = RawResponse::json(
            200,
            &json!({"ok": true, "data": [1, 2, 3], "timestamp": "t"}),
        );
        assert_eq!(unwrap_success(&raw), json!([1, 2, 3]));
    }

    #[test]
    fn unwrap_returns_null_data_as_null() {
        let raw = RawResponse::json(200, &json!({"ok": true, "data": null}));
        assert_eq!(unwrap_success(&raw), Value::Null);
    }

    #[test]
    fn unwrap_passes_envelope_less_json_through() {
        let body = json!({"status": "healthy"});
        let raw = RawResponse::json(200, &body);
        assert_eq!(unwrap_success(&raw), body);
    }

    #[test]
    fn unwrap_passes_text_through_verbatim() {
        let raw = RawResponse::new(200, Some("text/csv"), "id,name\n1,Tea\n");
        assert_eq!(unwrap_success(&raw), json!("id,name\n1,Tea\n"));
    }

    #[test]
    fn unwrap_does_not_parse_json_looking_text() {
        let raw = RawResponse::new(200, Some("text/plain"), r#"{"data": 1}"#);
        assert_eq!(unwrap_success(&raw), json!(r#"{"data": 1}"#));
    }

    #[test]
    fn unwrap_invalid_json_returns_text() {
        let raw = RawResponse::new(200, Some("application/json"), "{not json");
        assert_eq!(unwrap_success(&raw), json!("{not json"));
    }

    #[test]
    fn unwrap_empty_body_is_null() {
        let raw = RawResponse::new(204, None, "");
        assert_eq!(unwrap_success(&raw), Value::Null);
    }
}
