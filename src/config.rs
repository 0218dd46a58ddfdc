//! Client configuration sourced from the environment.

use thiserror::Error;
use url::Url;

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "COMMERCE_API_BASE_URL";

/// Environment variable naming the token store key.
pub const TOKEN_KEY_ENV: &str = "COMMERCE_AUTH_TOKEN_KEY";

/// Base URL used when the environment does not supply one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Token store key used when the environment does not supply one.
pub const DEFAULT_TOKEN_KEY: &str = "auth_token";

/// Errors raised while building a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL could not be parsed.
    #[error("invalid API base URL '{value}': {source}")]
    InvalidBaseUrl {
        /// The rejected value
        value: String,
        /// Parser error
        #[source]
        source: url::ParseError,
    },

    /// The base URL cannot carry a path (e.g. `mailto:`).
    #[error("API base URL '{0}' cannot be used as a REST root")]
    NotABase(String),

    /// The token key was empty.
    #[error("auth token key must not be empty")]
    EmptyTokenKey,
}

/// Where the backend lives and where the session token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Url,
    token_key: String,
    user_agent: String,
}

impl ClientConfig {
    /// Builds a config for `base_url` with the default token key.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            user_agent: default_user_agent(),
        })
    }

    /// Reads [`BASE_URL_ENV`] and [`TOKEN_KEY_ENV`], falling back to the
    /// local development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup(BASE_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let config = Self::new(base.trim())?;

        match lookup(TOKEN_KEY_ENV) {
            Some(key) if !key.trim().is_empty() => config.with_token_key(key.trim()),
            _ => Ok(config),
        }
    }

    /// Replaces the base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Replaces the token store key.
    pub fn with_token_key(mut self, key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyTokenKey);
        }
        self.token_key = key;
        Ok(self)
    }

    /// Replaces the `User-Agent` sent with every request.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The REST root, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Key the session token is stored under.
    pub fn token_key(&self) -> &str {
        &self.token_key
    }

    /// The `User-Agent` header value.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Resolves a REST path against the base URL.
    ///
    /// Leading slashes on `path` are ignored so `/settings` stays under the
    /// base path instead of replacing it. A query string on `path` is kept.
    pub fn endpoint(&self, path: &str) -> String {
        let relative = path.trim_start_matches('/');
        match self.base_url.join(relative) {
            Ok(url) => url.to_string(),
            // join only fails on malformed relative input; keep the string form
            Err(_) => format!("{}{}", self.base_url, relative),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:8000/api/").expect("default URL is valid"),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    // Url::join treats the last segment as a file unless the path ends in '/'.
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };

    let url = Url::parse(&normalized).map_err(|source| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        source,
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::NotABase(value.to_string()));
    }
    Ok(url)
}
