//! Client-side form validation. Failures never reach the network.

use std::fmt;

use crate::Secret;

/// Kind of field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Field is empty or contains only whitespace.
    Required,
    /// Field exceeds its maximum length.
    TooLong,
    /// Field contains control or non-printable characters.
    ContainsControlChars,
    /// Field does not match the expected format.
    InvalidFormat,
    /// A credential of the wrong type was supplied (e.g. secret key in the
    /// publishable key field).
    WrongKeyType,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::TooLong => write!(f, "too long"),
            Self::ContainsControlChars => write!(f, "contains control characters"),
            Self::InvalidFormat => write!(f, "invalid format"),
            Self::WrongKeyType => write!(f, "wrong key type"),
        }
    }
}

/// A single rejected form field.
///
/// Messages describe the rule, never the rejected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name
    pub field: String,
    /// What failed
    pub kind: FieldErrorKind,
    /// Message rendered next to the field
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// One or more rejected fields. Never sent to the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Per-field errors, in form order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// First error for `field`, for inline rendering.
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, error) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Collects field checks and fails if any of them did.
///
/// # Examples
///
/// ```
/// use commerce_client::validate::{Validator, FieldErrorKind};
///
/// let mut v = Validator::new();
/// v.required_text("store_name", "  ", 80);
/// v.email("email", "owner@shop.example");
///
/// let errors = v.finish().unwrap_err();
/// assert_eq!(errors.errors().len(), 1);
/// assert_eq!(errors.for_field("store_name").unwrap().kind, FieldErrorKind::Required);
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

/// Which side of a payment key pair a field expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// `pk_…` / `rzp_…` key ids, safe for the storefront.
    Publishable,
    /// `sk_…` / `rk_…` keys, server-side only.
    Secret,
}

impl Validator {
    /// Creates an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure from a rule this type does not cover.
    pub fn reject(&mut self, field: &str, kind: FieldErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, kind, message));
    }

    /// Non-empty single-line text of at most `max_len` characters.
    pub fn required_text(&mut self, field: &str, value: &str, max_len: usize) -> bool {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.reject(field, FieldErrorKind::Required, "This field is required");
            return false;
        }
        if trimmed.chars().any(|c| c.is_control()) {
            self.reject(
                field,
                FieldErrorKind::ContainsControlChars,
                "Must not contain line breaks or control characters",
            );
            return false;
        }
        if trimmed.chars().count() > max_len {
            self.reject(
                field,
                FieldErrorKind::TooLong,
                format!("Must be at most {max_len} characters"),
            );
            return false;
        }
        true
    }

    /// Optional text: empty passes, anything else follows [`required_text`](Self::required_text).
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max_len: usize) -> bool {
        match value {
            Some(v) if !v.trim().is_empty() => self.required_text(field, v, max_len),
            _ => true,
        }
    }

    /// A plausible email address.
    pub fn email(&mut self, field: &str, value: &str) -> bool {
        if !self.required_text(field, value, 254) {
            return false;
        }
        let trimmed = value.trim();
        let valid = match trimmed.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !trimmed.contains(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            self.reject(field, FieldErrorKind::InvalidFormat, "Enter a valid email address");
        }
        valid
    }

    /// E.164 phone number: `+`, then 8 to 15 digits, first digit non-zero.
    ///
    /// Spaces, dashes and parentheses are tolerated.
    pub fn phone_number(&mut self, field: &str, value: &str) -> bool {
        if !self.required_text(field, value, 32) {
            return false;
        }
        let trimmed = value.trim();
        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        let only_allowed = trimmed
            .chars()
            .skip(1)
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
        let valid = trimmed.starts_with('+')
            && only_allowed
            && (8..=15).contains(&digits.len())
            && !digits.starts_with('0');
        if !valid {
            self.reject(
                field,
                FieldErrorKind::InvalidFormat,
                "Enter the number in international format, e.g. +14155552671",
            );
        }
        valid
    }

    /// Non-empty numeric identifier (WhatsApp phone number id, business account id).
    pub fn numeric_id(&mut self, field: &str, value: &str) -> bool {
        if !self.required_text(field, value, 32) {
            return false;
        }
        let valid = value.trim().chars().all(|c| c.is_ascii_digit());
        if !valid {
            self.reject(field, FieldErrorKind::InvalidFormat, "Must contain digits only");
        }
        valid
    }

    /// A payment key of the expected kind.
    pub fn payment_key(&mut self, field: &str, value: &Secret<String>, expected: KeyKind) -> bool {
        let key = value.expose_secret().trim();
        if key.is_empty() {
            self.reject(field, FieldErrorKind::Required, "This field is required");
            return false;
        }
        if key.chars().any(|c| c.is_control() || c.is_whitespace()) {
            self.reject(
                field,
                FieldErrorKind::InvalidFormat,
                "Keys must not contain spaces or line breaks",
            );
            return false;
        }

        let publishable = ["pk_test_", "pk_live_", "rzp_test_", "rzp_live_"];
        let secret = ["sk_test_", "sk_live_", "rk_test_", "rk_live_"];
        let is_publishable = publishable.iter().any(|p| key.starts_with(p));
        let is_secret = secret.iter().any(|p| key.starts_with(p));

        match (expected, is_publishable, is_secret) {
            (KeyKind::Publishable, true, _) | (KeyKind::Secret, _, true) => true,
            (KeyKind::Publishable, false, true) => {
                self.reject(
                    field,
                    FieldErrorKind::WrongKeyType,
                    "This is a secret key. Paste the publishable key here",
                );
                false
            }
            (KeyKind::Secret, true, false) => {
                self.reject(
                    field,
                    FieldErrorKind::WrongKeyType,
                    "This is a publishable key. Paste the secret key here",
                );
                false
            }
            _ => {
                self.reject(
                    field,
                    FieldErrorKind::InvalidFormat,
                    "Key format not recognized",
                );
                false
            }
        }
    }

    /// Non-empty credential that is never echoed back in messages.
    pub fn required_secret(&mut self, field: &str, value: &Secret<String>) -> bool {
        if value.is_blank() {
            self.reject(field, FieldErrorKind::Required, "This field is required");
            return false;
        }
        true
    }

    /// Ok if every check passed.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}
