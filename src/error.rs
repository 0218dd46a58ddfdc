use thiserror::Error;

use crate::config::ConfigError;
use crate::envelope::{extract_error_code, extract_error_message};
use crate::mask::MaskError;
use crate::redact::redact_message;
use crate::token_store::StoreError;
use crate::transport::{RawResponse, TransportError};
use crate::validate::ValidationErrors;

/// Error code the backend uses for a rejected or expired session.
pub const AUTHORIZATION_FAILED: &str = "AUTHORIZATION_FAILED";

/// Message shown instead of the server's text for an expired session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// The server answered with a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HttpError {
    /// Numeric HTTP status
    pub status: u16,
    /// Reason phrase
    pub status_text: String,
    /// Server error code, when the body carried one
    pub code: Option<String>,
    /// Best-effort human-readable message
    pub message: String,
}

impl HttpError {
    /// Builds the error from a non-2xx response.
    ///
    /// The message comes from the body when it parses as JSON and carries one,
    /// otherwise from the status text. The body is parsed whatever the
    /// declared content type. A 403 with [`AUTHORIZATION_FAILED`]
    /// always yields [`SESSION_EXPIRED_MESSAGE`].
    pub fn from_response(raw: &RawResponse) -> Self {
        let body = serde_json::from_slice::<serde_json::Value>(&raw.body).ok();
        let code = body.as_ref().and_then(extract_error_code);

        let message = if raw.status == 403 && code.as_deref() == Some(AUTHORIZATION_FAILED) {
            SESSION_EXPIRED_MESSAGE.to_string()
        } else {
            body.as_ref()
                .and_then(extract_error_message)
                .unwrap_or_else(|| fallback_message(raw))
        };

        Self {
            status: raw.status,
            status_text: raw.status_text.clone(),
            code,
            message,
        }
    }

    /// Returns `true` if the session must be re-established.
    pub fn requires_login(&self) -> bool {
        self.status == 401
            || (self.status == 403 && self.code.as_deref() == Some(AUTHORIZATION_FAILED))
    }
}

fn fallback_message(raw: &RawResponse) -> String {
    if raw.status_text.is_empty() {
        format!("HTTP {}", raw.status)
    } else {
        raw.status_text.clone()
    }
}

/// Errors returned by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response reached the client. Reported with status 0.
    #[error("network error: {message}")]
    Network {
        /// Transport failure description
        message: String,
    },

    /// The server answered with a non-success status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Input was rejected before anything was sent.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A credential was refused by the masking policy.
    #[error(transparent)]
    CredentialPolicy(#[from] MaskError),

    /// A successful response did not have the expected shape.
    #[error("unexpected response: {message}")]
    Decode {
        /// What did not match
        message: String,
    },

    /// The request could not be built.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What was wrong
        message: String,
    },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The token store could not be written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        ClientError::Network {
            message: err.message().to_string(),
        }
    }
}

impl ClientError {
    /// Status code for errors that involved the network.
    ///
    /// `Some(0)` when no response arrived, the HTTP status for server
    /// errors, `None` for errors raised before sending.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Network { .. } => Some(0),
            ClientError::Http(e) => Some(e.status),
            _ => None,
        }
    }

    /// Returns `true` if the user must log in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.requires_login())
    }

    /// Text safe to render in a banner or send to telemetry.
    pub fn user_message(&self) -> String {
        redact_message(&self.to_string())
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        ClientError::Decode {
            message: message.into(),
        }
    }
}
