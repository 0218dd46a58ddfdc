use std::fmt;

use serde_json::Value;

use crate::redact::{redact_message, sanitize_value};

/// Request-scoped logger that scrubs credentials before emitting.
///
/// Messages go through [`redact_message`] and structured payloads through
/// [`sanitize_value`], so a form body or a server error that happens to
/// carry a key is masked before it reaches the subscriber.
///
/// Every event carries the request id.
#[derive(Debug, Clone, Copy)]
pub struct SafeLog<'a> {
    request_id: &'a str,
}

impl<'a> SafeLog<'a> {
    /// Creates a logger for one request.
    pub fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs an info-level message.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        let message = redact_message(&args.to_string());
        tracing::info!(request_id = %self.request_id, "{}", message);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        let message = redact_message(&args.to_string());
        tracing::warn!(request_id = %self.request_id, "{}", message);
    }

    /// Logs an error-level message.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        let message = redact_message(&args.to_string());
        tracing::error!(request_id = %self.request_id, "{}", message);
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        let message = redact_message(&args.to_string());
        tracing::debug!(request_id = %self.request_id, "{}", message);
    }

    /// Logs a debug-level event with a sanitized JSON payload attached.
    pub fn payload(&self, label: &str, payload: &Value) {
        let payload = sanitize_value(payload);
        tracing::debug!(request_id = %self.request_id, payload = %payload, "{}", label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn logger_carries_request_id() {
        let log = SafeLog::new("req-42");
        assert_eq!(log.request_id(), "req-42");

        let out = capture(|| log.info(format_args!("saved business profile")));
        assert!(out.contains("req-42"));
        assert!(out.contains("saved business profile"));
    }

    #[test]
    fn messages_are_redacted() {
        let log = SafeLog::new("req-1");
        let out = capture(|| {
            log.warn(format_args!("stripe rejected sk_live_51HxYzAbCdEf"));
            log.error(format_args!("meta rejected EAAGm0PX4ZCpsBAKZAZBZCzLq8"));
        });

        assert!(!out.contains("sk_live_51HxYz"));
        assert!(!out.contains("EAAGm0PX4"));
        assert!(out.contains("[MASKED]"));
    }

    #[test]
    fn payloads_are_sanitized() {
        let log = SafeLog::new("req-2");
        let out = capture(|| {
            log.payload(
                "outbound body",
                &json!({"secret_key": "sk_test_abc", "display_name": "Chai Corner"}),
            )
        });

        assert!(!out.contains("sk_test_abc"));
        assert!(out.contains("Chai Corner"));
        assert!(out.contains("outbound body"));
    }
}
