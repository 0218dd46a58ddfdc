//! Credential management endpoints.
//!
//! Credentials go up and never come back: the backend answers with status
//! views that hold no secret material. Outbound values stay inside
//! [`Secret`] until the request body is built.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ClientResult;
use crate::mask::{mask_key, mask_payment_key, mask_phone_number, MaskError};
use crate::token_store::TokenStore;
use crate::transport::Transport;
use crate::validate::{KeyKind, Validator};
use crate::{Dispatcher, RequestDescriptor, Secret};

/// WhatsApp Cloud API connection details typed into the settings form.
#[derive(Debug)]
pub struct WhatsappCredentials {
    /// Phone number id from the Meta developer console
    pub phone_number_id: String,
    /// WhatsApp Business Account id
    pub business_account_id: String,
    /// Long-lived platform access token (`EAA…`)
    pub access_token: Secret<String>,
    /// Webhook verify token chosen by the merchant
    pub verify_token: Option<Secret<String>>,
}

impl WhatsappCredentials {
    fn validate(&self) -> ClientResult<()> {
        let mut v = Validator::new();
        v.numeric_id("phone_number_id", &self.phone_number_id);
        v.numeric_id("business_account_id", &self.business_account_id);
        v.required_secret("access_token", &self.access_token);
        Ok(v.finish()?)
    }

    /// Masked preview of the access token.
    ///
    /// Platform tokens are refused outright; the form shows a fixed
    /// "token saved" state instead of any part of the value.
    pub fn access_token_preview(&self) -> Result<String, MaskError> {
        mask_key(self.access_token.expose_secret())
    }
}

/// Connection state reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsappStatus {
    /// Whether a working connection exists
    pub connected: bool,
    /// Phone number id in use
    #[serde(default)]
    pub phone_number_id: Option<String>,
    /// Number customers see
    #[serde(default)]
    pub display_phone_number: Option<String>,
    /// Name Meta verified for the number
    #[serde(default)]
    pub verified_name: Option<String>,
}

impl WhatsappStatus {
    /// Display number with its middle digits hidden.
    pub fn masked_phone_number(&self) -> Option<String> {
        self.display_phone_number.as_deref().map(mask_phone_number)
    }
}

/// Supported payment providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    /// Stripe: `pk_…` / `sk_…` key pair
    Stripe,
    /// Razorpay: `rzp_…` key id plus an unprefixed key secret
    Razorpay,
}

/// Payment keys typed into the settings form.
#[derive(Debug)]
pub struct PaymentKeys {
    /// Provider the keys belong to
    pub provider: PaymentProvider,
    /// Publishable key / key id
    pub publishable_key: Secret<String>,
    /// Secret key / key secret
    pub secret_key: Secret<String>,
    /// Webhook signing secret
    pub webhook_secret: Option<Secret<String>>,
}

impl PaymentKeys {
    fn validate(&self) -> ClientResult<()> {
        let mut v = Validator::new();
        v.payment_key("publishable_key", &self.publishable_key, KeyKind::Publishable);
        match self.provider {
            PaymentProvider::Stripe => {
                v.payment_key("secret_key", &self.secret_key, KeyKind::Secret);
            }
            PaymentProvider::Razorpay => {
                v.required_secret("secret_key", &self.secret_key);
            }
        }
        Ok(v.finish()?)
    }
}

/// Payment configuration reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    /// Whether keys are stored
    pub configured: bool,
    /// Provider, when configured
    #[serde(default)]
    pub provider: Option<PaymentProvider>,
    /// Publishable key (not secret, but still masked for display)
    #[serde(default)]
    pub publishable_key: Option<String>,
    /// `test` or `live`
    #[serde(default)]
    pub mode: Option<String>,
}

impl PaymentStatus {
    /// Publishable key masked for display.
    pub fn masked_publishable_key(&self) -> Option<Result<String, MaskError>> {
        self.publishable_key.as_deref().map(mask_payment_key)
    }
}

/// Credential endpoints.
pub struct CredentialsApi<'a, T, S> {
    client: &'a Dispatcher<T, S>,
}

impl<'a, T: Transport, S: TokenStore> CredentialsApi<'a, T, S> {
    /// Wraps a dispatcher.
    pub fn new(client: &'a Dispatcher<T, S>) -> Self {
        Self { client }
    }

    /// `GET /credentials/whatsapp`
    pub async fn whatsapp_status(&self) -> ClientResult<WhatsappStatus> {
        self.client.get("/credentials/whatsapp").await
    }

    /// `PUT /credentials/whatsapp`
    pub async fn save_whatsapp_credentials(
        &self,
        credentials: &WhatsappCredentials,
    ) -> ClientResult<WhatsappStatus> {
        credentials.validate()?;

        let mut body = json!({
            "phone_number_id": credentials.phone_number_id.trim(),
            "business_account_id": credentials.business_account_id.trim(),
            "access_token": credentials.access_token.expose_secret().trim(),
        });
        if let Some(verify) = credentials.verify_token.as_ref().filter(|t| !t.is_blank()) {
            body["verify_token"] = json!(verify.expose_secret().trim());
        }

        self.client
            .send_json(RequestDescriptor::put("/credentials/whatsapp").json(body))
            .await
    }

    /// `GET /credentials/payments`
    pub async fn payment_status(&self) -> ClientResult<PaymentStatus> {
        self.client.get("/credentials/payments").await
    }

    /// `PUT /credentials/payments`
    pub async fn save_payment_keys(&self, keys: &PaymentKeys) -> ClientResult<PaymentStatus> {
        keys.validate()?;

        let mut body = json!({
            "provider": keys.provider,
            "publishable_key": keys.publishable_key.expose_secret().trim(),
            "secret_key": keys.secret_key.expose_secret().trim(),
        });
        if let Some(secret) = keys.webhook_secret.as_ref().filter(|s| !s.is_blank()) {
            body["webhook_secret"] = json!(secret.expose_secret().trim());
        }

        self.client
            .send_json(RequestDescriptor::put("/credentials/payments").json(body))
            .await
    }

    /// `DELETE /credentials/payments`
    pub async fn delete_payment_keys(&self) -> ClientResult<()> {
        self.client
            .send(RequestDescriptor::delete("/credentials/payments"))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::FakeTransport;
    use crate::{ClientConfig, ClientError, MemoryTokenStore, RawResponse, RequestBody};

    fn client(transport: FakeTransport) -> Dispatcher<FakeTransport, MemoryTokenStore> {
        Dispatcher::new(
            ClientConfig::new("https://api.example.com").unwrap(),
            transport,
            MemoryTokenStore::with_token("t"),
        )
    }

    fn whatsapp() -> WhatsappCredentials {
        WhatsappCredentials {
            phone_number_id: "106540352242922".into(),
            business_account_id: "102290129340398".into(),
            access_token: Secret::from("EAAGm0PX4ZCpsBAKZAZBZCzLq8ZBJ2"),
            verify_token: Some(Secret::from("my-verify-token")),
        }
    }

    #[test]
    fn platform_token_preview_is_refused() {
        assert_eq!(
            whatsapp().access_token_preview(),
            Err(MaskError::PlatformToken)
        );
    }

    #[test]
    fn credential_debug_never_shows_token() {
        let output = format!("{:?}", whatsapp());
        assert!(!output.contains("EAAGm0"));
        assert!(!output.contains("my-verify-token"));
        assert!(output.contains("106540352242922"));
    }

    #[tokio::test]
    async fn saves_whatsapp_credentials() {
        let d = client(FakeTransport::new().respond_json(
            200,
            json!({"ok": true, "data": {
                "connected": true,
                "phone_number_id": "106540352242922",
                "display_phone_number": "+1 555 010 9999",
                "verified_name": "Chai Corner"
            }}),
        ));

        let status = CredentialsApi::new(&d)
            .save_whatsapp_credentials(&whatsapp())
            .await
            .unwrap();

        assert!(status.connected);
        assert_eq!(status.masked_phone_number().as_deref(), Some("+155******99"));

        let seen = d.transport().requests();
        assert_eq!(seen[0].url, "https://api.example.com/credentials/whatsapp");
        let RequestBody::Json(body) = &seen[0].body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["access_token"], "EAAGm0PX4ZCpsBAKZAZBZCzLq8ZBJ2");
        assert_eq!(body["verify_token"], "my-verify-token");
    }

    #[tokio::test]
    async fn blank_verify_token_is_omitted() {
        let d = client(FakeTransport::new().respond_json(200, json!({"connected": false})));

        let mut creds = whatsapp();
        creds.verify_token = Some(Secret::from("  "));
        CredentialsApi::new(&d)
            .save_whatsapp_credentials(&creds)
            .await
            .unwrap();

        let RequestBody::Json(body) = &d.transport().requests()[0].body else {
            panic!("expected JSON body");
        };
        assert!(body.get("verify_token").is_none());
    }

    #[tokio::test]
    async fn invalid_whatsapp_ids_are_not_sent() {
        let d = client(FakeTransport::new());

        let mut creds = whatsapp();
        creds.phone_number_id = "+1 555".into();
        let err = CredentialsApi::new(&d)
            .save_whatsapp_credentials(&creds)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(d.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn stripe_keys_must_be_the_right_way_round() {
        let d = client(FakeTransport::new());

        let keys = PaymentKeys {
            provider: PaymentProvider::Stripe,
            publishable_key: Secret::from("sk_test_abc"),
            secret_key: Secret::from("pk_test_abc"),
            webhook_secret: None,
        };
        let err = CredentialsApi::new(&d)
            .save_payment_keys(&keys)
            .await
            .unwrap_err();

        let ClientError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.errors().len(), 2);
        assert!(!errors.to_string().contains("sk_test_abc"));
    }

    #[tokio::test]
    async fn razorpay_secret_needs_no_prefix() {
        let d = client(FakeTransport::new().respond_json(
            200,
            json!({"ok": true, "data": {
                "configured": true,
                "provider": "razorpay",
                "publishable_key": "rzp_test_1DP5mmOlF5G5ag",
                "mode": "test"
            }}),
        ));

        let keys = PaymentKeys {
            provider: PaymentProvider::Razorpay,
            publishable_key: Secret::from("rzp_test_1DP5mmOlF5G5ag"),
            secret_key: Secret::from("thisisasecretvalue"),
            webhook_secret: Some(Secret::from("whsec_abc")),
        };
        let status = CredentialsApi::new(&d)
            .save_payment_keys(&keys)
            .await
            .unwrap();

        assert_eq!(status.provider, Some(PaymentProvider::Razorpay));
        assert_eq!(
            status.masked_publishable_key(),
            Some(Ok("rzp_test_**********G5ag".to_string()))
        );

        let RequestBody::Json(body) = &d.transport().requests()[0].body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["provider"], "razorpay");
        assert_eq!(body["webhook_secret"], "whsec_abc");
    }

    #[tokio::test]
    async fn payment_status_when_unconfigured() {
        let d = client(FakeTransport::new().respond_json(200, json!({"ok": true, "data": {"configured": false}})));

        let status = CredentialsApi::new(&d).payment_status().await.unwrap();
        assert!(!status.configured);
        assert!(status.masked_publishable_key().is_none());
    }

    #[tokio::test]
    async fn delete_payment_keys_accepts_empty_response() {
        let d = client(FakeTransport::new().respond(RawResponse::new(204, None, "")));

        CredentialsApi::new(&d).delete_payment_keys().await.unwrap();
        assert_eq!(
            d.transport().requests()[0].method,
            crate::HttpMethod::Delete
        );
    }
}
