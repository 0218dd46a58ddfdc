use std::fmt;

use serde::{Deserialize, Deserializer};

/// A credential that must never reach a log line, an error message, or the UI.
///
/// The auth token read from the [`TokenStore`](crate::TokenStore) and every
/// credential typed into a settings form travel through the client inside a
/// `Secret`. Formatting it with `{:?}` or `{}` yields `[REDACTED]`; the raw
/// value is only reachable through [`expose_secret`](Self::expose_secret),
/// which the client calls only where a credential has to leave the process:
/// the `Authorization` header, an outbound credential body, and the token
/// store's backing file.
///
/// # Examples
///
/// ```
/// use commerce_client::Secret;
///
/// let token = Secret::new("eyJhbGciOiJIUzI1NiJ9.session".to_string());
///
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(format!("{}", token), "[REDACTED]");
/// assert!(token.expose_secret().starts_with("eyJ"));
/// ```
// Do NOT derive Clone, Copy, Default or Serialize: each one is a silent copy path.
// Deserialize is fine: it only moves a credential from the wire into the wrapper.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a credential.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Borrows the raw credential.
    ///
    /// The verbose name is deliberate: grep for it to audit every place a
    /// credential leaves its wrapper.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl Secret<String> {
    /// Returns `true` if the wrapped string is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.inner.trim().is_empty()
    }
}

impl From<String> for Secret<String> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

// No Deref, AsRef or Borrow. The only way in is expose_secret().

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Secret<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Secret::new)
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_redacts_debug() {
        let token = Secret::new("EAAGm0PX4ZCpsBAKZA".to_string());
        let debug_output = format!("{:?}", token);

        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("EAAG"));
        assert!(!debug_output.contains("String"));
    }

    #[test]
    fn secret_redacts_display() {
        let key = Secret::new("sk_live_51H8xyz");
        let display_output = format!("{}", key);

        assert_eq!(display_output, "[REDACTED]");
        assert!(!display_output.contains("sk_live"));
    }

    #[test]
    fn secret_redacts_inside_derived_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Form {
            account_id: String,
            secret_key: Secret<String>,
        }

        let form = Form {
            account_id: "acct_123".to_string(),
            secret_key: Secret::from("sk_test_abcdef"),
        };
        let output = format!("{:?}", form);

        assert!(output.contains("acct_123"));
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("sk_test_abcdef"));
    }

    #[test]
    fn secret_exposes_when_explicit() {
        let secret = Secret::new(42);
        assert_eq!(*secret.expose_secret(), 42);
    }

    #[test]
    fn secret_deserializes_from_wire() {
        #[derive(serde::Deserialize, Debug)]
        struct Login {
            access_token: Secret<String>,
        }

        let login: Login = serde_json::from_str(r#"{"access_token": "jwt-value"}"#).unwrap();
        assert_eq!(login.access_token.expose_secret(), "jwt-value");
        assert!(!format!("{:?}", login).contains("jwt-value"));
    }

    #[test]
    fn blank_detection_trims() {
        assert!(Secret::from("   ").is_blank());
        assert!(Secret::from("").is_blank());
        assert!(!Secret::from(" x ").is_blank());
    }
}
