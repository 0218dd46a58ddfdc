//! HTTP client core for a WhatsApp commerce dashboard.
//!
//! This crate provides the request layer the dashboard UI sits on, with
//! credential safety enforced by types rather than by convention:
//! - **Token-fresh dispatch**: every request reads the auth token from the
//!   [`TokenStore`] at send time, so login and logout take effect on the very
//!   next call
//! - **Uniform errors**: failed responses become an [`HttpError`] carrying
//!   status, code and a message fit for display
//! - **Credential masking**: [`mask_key`] and [`mask_payment_key`] produce
//!   display forms, and refuse platform tokens outright
//! - **Log hygiene**: [`sanitize_for_logging`] and [`contains_credentials`]
//!   keep secrets out of diagnostics
//!
//! # Core Types
//!
//! - [`Dispatcher`]: Sends [`RequestDescriptor`]s through a [`Transport`]
//! - [`Secret<T>`]: Wrapper that redacts credentials in logs and errors
//! - [`ClientError`]: Everything a call can fail with
//! - [`SafeLog`]: Logging handle that redacts what it is given
//!
//! # Examples
//!
//! ```
//! use commerce_client::{mask_key, mask_payment_key, Secret};
//!
//! // Secrets are redacted when formatted
//! let key = Secret::new("sk_live_51H8xyzabcdef".to_string());
//! assert_eq!(format!("{:?}", key), "[REDACTED]");
//!
//! // Display forms keep only the ends
//! assert_eq!(mask_payment_key("sk_live_51H8xyzabcdef").unwrap(), "sk_live_*********cdef");
//!
//! // Platform tokens are never shown, not even partially
//! assert!(mask_key("EAAGm0PX4ZCpsBAKZAZBZCzLq8ZBJ2").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
mod config;
mod dispatcher;
pub mod envelope;
mod error;
mod logging;
mod mask;
mod redact;
mod request;
mod secret;
mod token_store;
mod transport;
pub mod upload;
pub mod validate;

pub use config::{
    ClientConfig, ConfigError, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_TOKEN_KEY, TOKEN_KEY_ENV,
};
pub use dispatcher::{Dispatcher, REQUEST_ID_HEADER};
pub use error::{ClientError, ClientResult, HttpError, AUTHORIZATION_FAILED, SESSION_EXPIRED_MESSAGE};
pub use logging::SafeLog;
pub use mask::{is_platform_token, mask_key, mask_payment_key, mask_phone_number, MaskError};
pub use redact::{
    contains_credentials, is_sensitive_field, redact_message, sanitize_for_logging,
    sanitize_value, MASKED_PLACEHOLDER, SENSITIVE_FIELDS,
};
pub use request::{FormPart, HttpMethod, MultipartForm, PreparedRequest, RequestBody, RequestDescriptor};
pub use secret::Secret;
pub use token_store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportError};
pub use upload::{upload_image, ImageFile, UploadEndpoint, UploadedAsset};
