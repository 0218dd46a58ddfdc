use std::fmt;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT,
};

use crate::{ClientConfig, ClientError, Secret};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP PATCH method
    Patch,
    /// HTTP DELETE method
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        })
    }
}

/// One part of a multipart form.
#[derive(Clone, PartialEq, Eq)]
pub enum FormPart {
    /// Plain text field.
    Text {
        /// Field name
        name: String,
        /// Field value
        value: String,
    },
    /// File field.
    File {
        /// Field name
        name: String,
        /// File name reported to the server
        file_name: String,
        /// MIME type of the payload
        mime: String,
        /// Raw file contents
        bytes: Vec<u8>,
    },
}

impl FormPart {
    /// Field name of this part.
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

// File contents are summarized by length; text values may be form input.
impl fmt::Debug for FormPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormPart::Text { name, value } => f
                .debug_struct("Text")
                .field("name", name)
                .field("value_len", &value.len())
                .finish(),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => f
                .debug_struct("File")
                .field("name", name)
                .field("file_name", file_name)
                .field("mime", mime)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Ordered multipart payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Field name upload endpoints expect the file under.
    pub const FILE_FIELD: &'static str = "file";

    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// A form holding a single `file` field, as the upload endpoints expect.
    pub fn single_file(
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
    ) -> Self {
        Self::new().file(Self::FILE_FIELD, bytes, file_name, mime)
    }

    /// Appends a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a file field.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    /// Parts in insertion order.
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }
}

/// Body of an outbound request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document.
    Json(serde_json::Value),
    /// Multipart form; the transport supplies the boundary.
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Returns `true` for multipart bodies.
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

/// A logical API call, before credentials and defaults are applied.
///
/// Constructed per call and never reused across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// REST path relative to the base URL
    pub path: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Caller header overrides, applied last
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: RequestBody,
}

impl RequestDescriptor {
    /// Creates a descriptor with no body and no header overrides.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// `POST path`
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// `PUT path`
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// `PATCH path`
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// `DELETE path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Sets a multipart body.
    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Adds a header override.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Resolves the call into what goes on the wire.
    ///
    /// `token` is whatever the store held at call time; `None` produces an
    /// unauthenticated request.
    pub fn prepare(
        self,
        config: &ClientConfig,
        token: Option<&Secret<String>>,
    ) -> Result<PreparedRequest, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, header_value(config.user_agent())?);

        if !self.body.is_multipart() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if let Some(token) = token.filter(|t| !t.is_blank()) {
            let mut value = header_value(&format!("Bearer {}", token.expose_secret()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ClientError::InvalidRequest {
                    message: format!("invalid header name '{name}'"),
                }
            })?;
            // Multipart boundaries belong to the transport.
            if name == CONTENT_TYPE && self.body.is_multipart() {
                continue;
            }
            let mut value = header_value(value)?;
            if name == AUTHORIZATION {
                value.set_sensitive(true);
            }
            headers.insert(name, value);
        }

        Ok(PreparedRequest {
            method: self.method,
            url: config.endpoint(&self.path),
            path: self.path,
            headers,
            body: self.body,
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidRequest {
        message: "header value contains characters not allowed in HTTP headers".to_string(),
    })
}

/// A fully-resolved request, ready for a [`Transport`](crate::Transport).
///
/// `Debug` output never shows the `Authorization` value.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// The path as the caller wrote it, for logging
    pub path: String,
    /// Final headers
    pub headers: HeaderMap,
    /// Request body
    pub body: RequestBody,
}

impl PreparedRequest {
    /// Returns `true` if the request carries credentials.
    pub fn is_authenticated(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    /// Bearer token sent with this request, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    /// Value of a header as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
