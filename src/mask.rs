//! Display masking for credentials.
//!
//! A masked value keeps enough of the original for a person to tell which
//! credential is on screen, and never enough to reconstruct it. Masking is
//! one-way: nothing here can turn a masked string back into a key.

use thiserror::Error;

/// Character that replaces hidden positions.
pub const MASK_CHAR: char = '*';

/// Characters kept at the start by [`mask_key`].
pub const PREFIX_LEN: usize = 8;

/// Characters kept at the end by [`mask_key`] and [`mask_payment_key`].
pub const SUFFIX_LEN: usize = 4;

/// Prefix of long-lived Meta platform (WhatsApp Cloud API) access tokens.
pub const PLATFORM_TOKEN_PREFIX: &str = "EAA";

/// Payment provider prefixes recognized by [`mask_payment_key`].
pub const PAYMENT_KEY_PREFIXES: &[&str] = &[
    "pk_test_",
    "pk_live_",
    "sk_test_",
    "sk_live_",
    "rk_test_",
    "rk_live_",
    "rzp_test_",
    "rzp_live_",
    "whsec_",
];

/// Refusals from the masking policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MaskError {
    /// Platform access tokens are never displayed, not even masked.
    #[error("platform access tokens cannot be displayed, even masked")]
    PlatformToken,
}

/// Returns `true` for long-lived platform tokens that must never be shown.
pub fn is_platform_token(value: &str) -> bool {
    value.trim_start().starts_with(PLATFORM_TOKEN_PREFIX)
}

/// Masks a secret for display.
///
/// Keeps the first [`PREFIX_LEN`] and last [`SUFFIX_LEN`] characters and
/// replaces the rest with [`MASK_CHAR`]; length is unchanged. Keys too short
/// to keep both ends with something hidden between them are masked entirely.
///
/// # Errors
///
/// [`MaskError::PlatformToken`] for values starting with `EAA`.
///
/// # Examples
///
/// ```
/// use commerce_client::mask_key;
///
/// assert_eq!(mask_key("pk_test_abcdef1234567890").unwrap(), "pk_test_************7890");
/// assert!(mask_key("EAAGm0PX4ZCpsBA").is_err());
/// ```
pub fn mask_key(key: &str) -> Result<String, MaskError> {
    if is_platform_token(key) {
        return Err(MaskError::PlatformToken);
    }
    Ok(keep_ends(key, PREFIX_LEN, SUFFIX_LEN))
}

/// Masks a payment provider key, keeping its mode marker readable.
///
/// `sk_live_…` stays recognizable as a live secret key; the part after the
/// prefix keeps only its last [`SUFFIX_LEN`] characters. Unrecognized formats
/// go through [`mask_key`].
///
/// # Examples
///
/// ```
/// use commerce_client::mask_payment_key;
///
/// assert_eq!(mask_payment_key("whsec_abcdefgh1234").unwrap(), "whsec_********1234");
/// ```
pub fn mask_payment_key(key: &str) -> Result<String, MaskError> {
    match PAYMENT_KEY_PREFIXES
        .iter()
        .find(|prefix| key.starts_with(*prefix))
    {
        Some(prefix) => {
            let rest = &key[prefix.len()..];
            Ok(format!("{prefix}{}", keep_ends(rest, 0, SUFFIX_LEN)))
        }
        None => mask_key(key),
    }
}

/// Masks a phone number, keeping `+`, up to three leading digits and the last two.
///
/// Formatting characters are dropped. Numbers with five digits or fewer are
/// fully masked.
pub fn mask_phone_number(number: &str) -> String {
    let plus = if number.trim_start().starts_with('+') {
        "+"
    } else {
        ""
    };
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 5 {
        return format!("{plus}{}", mask_run(digits.len()));
    }
    format!("{plus}{}", keep_ends(&digits, 3, 2))
}

fn keep_ends(value: &str, prefix: usize, suffix: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= prefix + suffix {
        return mask_run(len);
    }

    let mut out = String::with_capacity(value.len());
    out.extend(&chars[..prefix]);
    out.push_str(&mask_run(len - prefix - suffix));
    out.extend(&chars[len - suffix..]);
    out
}

fn mask_run(len: usize) -> String {
    std::iter::repeat(MASK_CHAR).take(len).collect()
}
