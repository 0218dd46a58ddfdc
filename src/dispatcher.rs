//! Token-fresh request dispatch.
//!
//! [`Dispatcher`] turns one [`RequestDescriptor`] into one HTTP exchange and
//! one normalized result. It keeps no token of its own: the session token is
//! read from the [`TokenStore`] at the start of every call, so a request
//! issued after logout cannot carry the pre-logout token.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::envelope::unwrap_success;
use crate::error::{ClientError, ClientResult, HttpError};
use crate::logging::SafeLog;
use crate::request::{MultipartForm, RequestBody, RequestDescriptor};
use crate::token_store::{FileTokenStore, TokenStore};
use crate::transport::{ReqwestTransport, Transport};
use crate::ClientConfig;

/// Header callers can set to correlate client and server logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Performs API calls with credentials read fresh on every call.
///
/// Cloning is not required for concurrent use: every method takes `&self`
/// and no call mutates the dispatcher.
#[derive(Debug)]
pub struct Dispatcher<T, S> {
    config: ClientConfig,
    transport: T,
    store: S,
}

impl<S: TokenStore> Dispatcher<ReqwestTransport, S> {
    /// Dispatcher over the default `reqwest` transport, configured from the
    /// environment.
    pub fn from_env(store: S) -> ClientResult<Self> {
        Ok(Self::new(
            ClientConfig::from_env()?,
            ReqwestTransport::new(),
            store,
        ))
    }
}

impl Dispatcher<ReqwestTransport, FileTokenStore> {
    /// Dispatcher configured from the environment, keeping the session token
    /// in the file at `path` under the configured token key.
    pub fn from_env_with_file(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let config = ClientConfig::from_env()?;
        let store = FileTokenStore::from_config(path, &config);
        Ok(Self::new(config, ReqwestTransport::new(), store))
    }
}

impl<T: Transport, S: TokenStore> Dispatcher<T, S> {
    /// Creates a dispatcher.
    pub fn new(config: ClientConfig, transport: T, store: S) -> Self {
        Self {
            config,
            transport,
            store,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The token store this dispatcher reads from.
    pub fn token_store(&self) -> &S {
        &self.store
    }

    /// The transport requests go through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs one call and returns the unwrapped result.
    ///
    /// Success bodies shaped like an envelope yield their `data`; other JSON
    /// and non-JSON bodies come back as sent (text as a JSON string).
    ///
    /// # Errors
    ///
    /// - [`ClientError::Network`] (status 0) when no response arrived.
    /// - [`ClientError::Http`] for any non-2xx status.
    /// - [`ClientError::InvalidRequest`] if headers could not be encoded.
    pub async fn send(&self, descriptor: RequestDescriptor) -> ClientResult<Value> {
        let request_id = descriptor
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(REQUEST_ID_HEADER))
            .map_or_else(|| "-".to_string(), |(_, value)| value.clone());
        let log = SafeLog::new(&request_id);

        if let RequestBody::Json(body) = &descriptor.body {
            log.payload("request body", body);
        }

        // Read at call time, never cached: this is the only token access.
        let token = self.store.get();
        let prepared = descriptor.prepare(&self.config, token.as_ref())?;
        drop(token);

        let method = prepared.method;
        let path = prepared.path.clone();
        log.debug(format_args!(
            "{method} {path} (authenticated: {})",
            prepared.is_authenticated()
        ));

        let raw = match self.transport.send(prepared).await {
            Ok(raw) => raw,
            Err(err) => {
                log.warn(format_args!("{method} {path} failed without a response: {err}"));
                return Err(err.into());
            }
        };

        if !raw.is_success() {
            let err = HttpError::from_response(&raw);
            log.warn(format_args!(
                "{method} {path} -> {} {}: {}",
                err.status, err.status_text, err.message
            ));
            return Err(err.into());
        }

        log.debug(format_args!("{method} {path} -> {}", raw.status));
        Ok(unwrap_success(&raw))
    }

    /// Performs one call and deserializes the unwrapped result.
    pub async fn send_json<R: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> ClientResult<R> {
        let path = descriptor.path.clone();
        let value = self.send(descriptor).await?;
        serde_json::from_value(value)
            .map_err(|e| ClientError::decode(format!("response from {path}: {e}")))
    }

    /// `GET path`
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        self.send_json(RequestDescriptor::get(path)).await
    }

    /// `POST path` with a JSON body.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> ClientResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(RequestDescriptor::post(path).json(to_body(body)?))
            .await
    }

    /// `PUT path` with a JSON body.
    pub async fn put<B, R>(&self, path: &str, body: &B) -> ClientResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(RequestDescriptor::put(path).json(to_body(body)?))
            .await
    }

    /// `PATCH path` with a JSON body.
    pub async fn patch<B, R>(&self, path: &str, body: &B) -> ClientResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(RequestDescriptor::patch(path).json(to_body(body)?))
            .await
    }

    /// `DELETE path`
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        self.send_json(RequestDescriptor::delete(path)).await
    }

    /// `POST path` with a multipart body.
    pub async fn upload(&self, path: &str, form: MultipartForm) -> ClientResult<Value> {
        self.send(RequestDescriptor::post(path).multipart(form)).await
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> ClientResult<Value> {
    serde_json::to_value(body).map_err(|e| ClientError::InvalidRequest {
        message: format!("request body is not serializable: {e}"),
    })
}
