use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ClientResult;
use crate::token_store::TokenStore;
use crate::transport::Transport;
use crate::validate::Validator;
use crate::{Dispatcher, RequestDescriptor, Secret};

/// The signed-in dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User id
    pub id: String,
    /// Login email
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Business the user administers
    #[serde(default)]
    pub business_id: Option<String>,
}

/// Body of a successful login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Session token
    pub access_token: Secret<String>,
    /// Token type, normally `bearer`
    #[serde(default)]
    pub token_type: Option<String>,
    /// The user, when the backend includes it
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Session endpoints.
///
/// Login and logout are the only writers of the token store.
pub struct AuthApi<'a, T, S> {
    client: &'a Dispatcher<T, S>,
}

impl<'a, T: Transport, S: TokenStore> AuthApi<'a, T, S> {
    /// Wraps a dispatcher.
    pub fn new(client: &'a Dispatcher<T, S>) -> Self {
        Self { client }
    }

    /// Signs in and stores the session token.
    ///
    /// Returns the user when the backend includes it in the login response.
    pub async fn login(
        &self,
        email: &str,
        password: Secret<String>,
    ) -> ClientResult<Option<UserProfile>> {
        let mut v = Validator::new();
        v.email("email", email);
        v.required_secret("password", &password);
        v.finish()?;

        let body = json!({
            "email": email.trim(),
            "password": password.expose_secret(),
        });
        let response: LoginResponse = self.client.post("/auth/login", &body).await?;

        self.client.token_store().set(response.access_token)?;
        tracing::info!("session started");
        Ok(response.user)
    }

    /// Ends the session.
    ///
    /// The server call is best effort; the local token is cleared whether or
    /// not it succeeds, so the next request is unauthenticated either way.
    pub async fn logout(&self) -> ClientResult<()> {
        if self.client.token_store().get().is_some() {
            let result = self.client.send(RequestDescriptor::post("/auth/logout")).await;
            if let Err(err) = result {
                tracing::warn!(status = ?err.status(), error = %err.user_message(), "server-side logout failed");
            }
        }

        self.client.token_store().clear()?;
        tracing::info!("session ended");
        Ok(())
    }

    /// The signed-in user.
    pub async fn me(&self) -> ClientResult<UserProfile> {
        self.client.get("/auth/me").await
    }
}
