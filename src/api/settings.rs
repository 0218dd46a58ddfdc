use serde::{Deserialize, Serialize};

use crate::error::ClientResult;
use crate::token_store::TokenStore;
use crate::transport::Transport;
use crate::validate::Validator;
use crate::Dispatcher;

/// Longest business name the storefront renders.
pub const MAX_BUSINESS_NAME: usize = 80;

/// Longest business description.
pub const MAX_DESCRIPTION: usize = 500;

/// Business profile shown on the storefront and in WhatsApp messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Business id
    pub id: String,
    /// Display name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone (E.164)
    #[serde(default)]
    pub phone: Option<String>,
    /// Street address
    #[serde(default)]
    pub address: Option<String>,
    /// ISO 4217 currency code
    #[serde(default)]
    pub currency: Option<String>,
    /// IANA timezone
    #[serde(default)]
    pub timezone: Option<String>,
    /// Logo URL
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Fields a settings form can change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BusinessProfileUpdate {
    /// Display name
    pub name: String,
    /// Short description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone (E.164)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// ISO 4217 currency code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// IANA timezone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl BusinessProfileUpdate {
    fn validate(&self) -> ClientResult<()> {
        let mut v = Validator::new();
        v.required_text("name", &self.name, MAX_BUSINESS_NAME);
        v.optional_text("description", self.description.as_deref(), MAX_DESCRIPTION);
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            v.email("email", email);
        }
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            v.phone_number("phone", phone);
        }
        v.optional_text("address", self.address.as_deref(), 200);
        if let Some(currency) = self.currency.as_deref() {
            let valid = currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase());
            if !valid {
                v.reject(
                    "currency",
                    crate::validate::FieldErrorKind::InvalidFormat,
                    "Use a three-letter currency code such as USD",
                );
            }
        }
        Ok(v.finish()?)
    }
}

/// Onboarding wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStepKey {
    /// Business name, contact details and logo
    BusinessProfile,
    /// WhatsApp Cloud API connection
    WhatsappConnection,
    /// Payment provider keys
    PaymentSetup,
    /// First catalog products
    Catalog,
    /// A step this client does not know yet
    #[serde(other)]
    Unknown,
}

impl OnboardingStepKey {
    /// Path segment used by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            OnboardingStepKey::BusinessProfile => "business_profile",
            OnboardingStepKey::WhatsappConnection => "whatsapp_connection",
            OnboardingStepKey::PaymentSetup => "payment_setup",
            OnboardingStepKey::Catalog => "catalog",
            OnboardingStepKey::Unknown => "unknown",
        }
    }
}

/// One wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingStep {
    /// Which step
    pub key: OnboardingStepKey,
    /// Whether the user finished it
    #[serde(default)]
    pub completed: bool,
}

/// Progress through the onboarding wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingStatus {
    /// Steps in wizard order
    #[serde(default)]
    pub steps: Vec<OnboardingStep>,
    /// Whether onboarding is finished
    #[serde(default)]
    pub completed: bool,
}

impl OnboardingStatus {
    /// First step not yet completed, skipping steps this client cannot render.
    pub fn next_step(&self) -> Option<OnboardingStepKey> {
        self.steps
            .iter()
            .find(|s| !s.completed && s.key != OnboardingStepKey::Unknown)
            .map(|s| s.key)
    }
}

/// Business settings and onboarding endpoints.
pub struct SettingsApi<'a, T, S> {
    client: &'a Dispatcher<T, S>,
}

impl<'a, T: Transport, S: TokenStore> SettingsApi<'a, T, S> {
    /// Wraps a dispatcher.
    pub fn new(client: &'a Dispatcher<T, S>) -> Self {
        Self { client }
    }

    /// `GET /business`
    pub async fn business_profile(&self) -> ClientResult<BusinessProfile> {
        self.client.get("/business").await
    }

    /// `PUT /business`, after validating the form.
    pub async fn update_business_profile(
        &self,
        update: &BusinessProfileUpdate,
    ) -> ClientResult<BusinessProfile> {
        update.validate()?;
        self.client.put("/business", update).await
    }

    /// `GET /onboarding`
    pub async fn onboarding_status(&self) -> ClientResult<OnboardingStatus> {
        self.client.get("/onboarding").await
    }

    /// `POST /onboarding/steps/{step}/complete`
    pub async fn complete_onboarding_step(
        &self,
        step: OnboardingStepKey,
    ) -> ClientResult<OnboardingStatus> {
        let path = format!("/onboarding/steps/{}/complete", step.as_str());
        self.client
            .send_json(crate::RequestDescriptor::post(path))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::FakeTransport;
    use crate::{ClientConfig, ClientError, HttpMethod, MemoryTokenStore, RequestBody};
    use serde_json::json;

    fn client(transport: FakeTransport) -> Dispatcher<FakeTransport, MemoryTokenStore> {
        Dispatcher::new(
            ClientConfig::new("https://api.example.com").unwrap(),
            transport,
            MemoryTokenStore::with_token("t"),
        )
    }

    fn profile_json() -> serde_json::Value {
        json!({"id": "b1", "name": "Chai Corner", "currency": "INR"})
    }

    #[tokio::test]
    async fn reads_business_profile() {
        let d = client(FakeTransport::new().respond_json(200, json!({"ok": true, "data": profile_json()})));

        let profile = SettingsApi::new(&d).business_profile().await.unwrap();
        assert_eq!(profile.name, "Chai Corner");
        assert_eq!(profile.currency.as_deref(), Some("INR"));
        assert!(profile.logo_url.is_none());
    }

    #[tokio::test]
    async fn update_sends_only_set_fields() {
        let d = client(FakeTransport::new().respond_json(200, json!({"ok": true, "data": profile_json()})));

        let update = BusinessProfileUpdate {
            name: "Chai Corner".into(),
            phone: Some("+91 98765 43210".into()),
            ..Default::default()
        };
        SettingsApi::new(&d)
            .update_business_profile(&update)
            .await
            .unwrap();

        let seen = d.transport().requests();
        assert_eq!(seen[0].method, HttpMethod::Put);
        assert_eq!(
            seen[0].body,
            RequestBody::Json(json!({"name": "Chai Corner", "phone": "+91 98765 43210"}))
        );
    }

    #[tokio::test]
    async fn invalid_update_is_not_sent() {
        let d = client(FakeTransport::new());

        let update = BusinessProfileUpdate {
            name: " ".into(),
            email: Some("nope".into()),
            currency: Some("rupees".into()),
            ..Default::default()
        };
        let err = SettingsApi::new(&d)
            .update_business_profile(&update)
            .await
            .unwrap_err();

        let ClientError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.errors().len(), 3);
        assert!(errors.for_field("currency").is_some());
        assert!(d.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn onboarding_next_step_skips_completed_and_unknown() {
        let d = client(FakeTransport::new().respond_json(
            200,
            json!({"ok": true, "data": {
                "completed": false,
                "steps": [
                    {"key": "business_profile", "completed": true},
                    {"key": "shipping_zones", "completed": false},
                    {"key": "whatsapp_connection", "completed": false},
                    {"key": "payment_setup"}
                ]
            }}),
        ));

        let status = SettingsApi::new(&d).onboarding_status().await.unwrap();
        assert_eq!(status.steps[1].key, OnboardingStepKey::Unknown);
        assert_eq!(status.next_step(), Some(OnboardingStepKey::WhatsappConnection));
    }

    #[tokio::test]
    async fn completing_a_step_posts_to_its_path() {
        let d = client(FakeTransport::new().respond_json(
            200,
            json!({"ok": true, "data": {"completed": true, "steps": []}}),
        ));

        let status = SettingsApi::new(&d)
            .complete_onboarding_step(OnboardingStepKey::PaymentSetup)
            .await
            .unwrap();

        assert!(status.completed);
        assert_eq!(status.next_step(), None);
        let seen = d.transport().requests();
        assert_eq!(
            seen[0].url,
            "https://api.example.com/onboarding/steps/payment_setup/complete"
        );
        assert_eq!(seen[0].method, HttpMethod::Post);
    }
}
