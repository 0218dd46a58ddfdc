//! The seam between the dispatcher and the network.
//!
//! [`Transport`] moves one [`PreparedRequest`] onto the wire and hands back
//! whatever the server said, success or not. Interpreting the response is the
//! dispatcher's job. A transport error means no response arrived at all.

use async_trait::async_trait;
use reqwest::multipart;
use thiserror::Error;

use crate::request::{FormPart, HttpMethod, MultipartForm, PreparedRequest, RequestBody};

/// No response reached the client.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Creates a transport error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Everything the server sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Numeric HTTP status
    pub status: u16,
    /// Reason phrase (e.g. `Not Found`)
    pub status_text: String,
    /// `Content-Type` header, if present
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Builds a response with the canonical reason phrase for `status`.
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: canonical_reason(status).to_string(),
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// A JSON response.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, Some("application/json"), value.to_string())
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` if the server declared a JSON body.
    pub fn is_json(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| {
            let mime = ct.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case("application/json")
                || mime.to_ascii_lowercase().ends_with("+json")
        })
    }
}

fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

/// Sends prepared requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one HTTP exchange. Non-2xx statuses are `Ok`.
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError>;
}

/// Production transport over `reqwest`.
///
/// One pooled client is reused across calls; it carries no credentials.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing client (custom TLS roots, proxies, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn to_reqwest_form(form: MultipartForm) -> Result<multipart::Form, TransportError> {
    let mut out = multipart::Form::new();
    for part in form.parts().iter().cloned() {
        out = match part {
            FormPart::Text { name, value } => out.text(name, value),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let part = multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| TransportError::new(format!("invalid MIME type: {e}")))?;
                out.part(name, part)
            }
        };
    }
    Ok(out)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url)
            .headers(request.headers);

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(value.to_string()),
            RequestBody::Multipart(form) => builder.multipart(to_reqwest_form(form)?),
        };

        // reqwest error text can include the URL but never request headers.
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(format!("request failed: {e}")))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            content_type,
            body: body.to_vec(),
        })
    }
}
