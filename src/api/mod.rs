//! Endpoint wrappers for the dashboard backend.
//!
//! Each API struct borrows a [`Dispatcher`](crate::Dispatcher) and maps one
//! method to one REST call. They hold no state of their own, so creating one
//! per form submission is fine.
//!
//! Inputs are validated before anything is sent; a
//! [`ClientError::Validation`](crate::ClientError::Validation) means the
//! network was never touched.
//!
//! # Example Flow
//!
//! ```no_run
//! use commerce_client::api::{AuthApi, SettingsApi};
//! use commerce_client::{Dispatcher, Secret};
//!
//! # async fn run() -> Result<(), commerce_client::ClientError> {
//! let client = Dispatcher::from_env_with_file("storage.json")?;
//!
//! AuthApi::new(&client)
//!     .login("owner@shop.example", Secret::from("correct horse"))
//!     .await?;
//!
//! let profile = SettingsApi::new(&client).business_profile().await?;
//! println!("{}", profile.name);
//!
//! AuthApi::new(&client).logout().await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod credentials;
mod settings;

pub use auth::{AuthApi, LoginResponse, UserProfile};
pub use credentials::{
    CredentialsApi, PaymentKeys, PaymentProvider, PaymentStatus, WhatsappCredentials,
    WhatsappStatus,
};
pub use settings::{
    BusinessProfile, BusinessProfileUpdate, OnboardingStatus, OnboardingStep, OnboardingStepKey,
    SettingsApi,
};
