//! Image uploads.
//!
//! The upload endpoints do not agree on a response shape: some answer
//! `{"logo": {"url": "…"}}`, others `{"image_url": "…"}`. Each endpoint
//! declares its own shape here and all of them come back as one
//! [`UploadedAsset`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::request::MultipartForm;
use crate::token_store::TokenStore;
use crate::transport::Transport;
use crate::validate::{FieldErrorKind, Validator};
use crate::Dispatcher;

/// MIME types the image endpoints accept.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// Largest image the backend accepts, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// How an endpoint reports the stored file's URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadShape {
    /// `{"<field>": {"url": "…"}}`
    Nested(&'static str),
    /// `{"<field>": "…"}`, where the field name already ends in `_url`
    Flat(&'static str),
}

impl UploadShape {
    /// Pulls the URL out of a response body.
    pub fn extract_url(self, body: &Value) -> Option<&str> {
        match self {
            UploadShape::Nested(field) => body.get(field)?.get("url")?.as_str(),
            UploadShape::Flat(field) => body.get(field)?.as_str(),
        }
    }
}

/// The image upload endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEndpoint {
    /// Business logo shown on the storefront and in WhatsApp catalog headers.
    BusinessLogo,
    /// Product image for one catalog item.
    ProductImage {
        /// Product id
        product_id: String,
    },
    /// WhatsApp Business profile picture.
    ProfilePicture,
}

impl UploadEndpoint {
    /// REST path of the endpoint.
    pub fn path(&self) -> String {
        match self {
            UploadEndpoint::BusinessLogo => "/business/logo".to_string(),
            UploadEndpoint::ProductImage { product_id } => {
                format!("/products/{product_id}/image")
            }
            UploadEndpoint::ProfilePicture => "/whatsapp/profile-picture".to_string(),
        }
    }

    /// Response shape the endpoint answers with.
    pub fn shape(&self) -> UploadShape {
        match self {
            UploadEndpoint::BusinessLogo => UploadShape::Nested("logo"),
            UploadEndpoint::ProductImage { .. } => UploadShape::Flat("image_url"),
            UploadEndpoint::ProfilePicture => UploadShape::Nested("profile_picture"),
        }
    }
}

/// A stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Public URL of the stored file
    pub url: String,
}

/// An image picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name as picked
    pub file_name: String,
    /// MIME type
    pub mime: String,
    /// Contents
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Creates an image file.
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    fn check(&self) -> ClientResult<()> {
        let mut v = Validator::new();
        v.required_text("file_name", &self.file_name, 255);

        let accepted = ACCEPTED_IMAGE_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&self.mime));
        if !accepted {
            v.reject(
                "file",
                FieldErrorKind::InvalidFormat,
                "Upload a PNG, JPEG or WebP image",
            );
        } else if self.bytes.is_empty() {
            v.reject("file", FieldErrorKind::Required, "The selected file is empty");
        } else if self.bytes.len() > MAX_IMAGE_BYTES {
            v.reject("file", FieldErrorKind::TooLong, "Images must be 5 MB or smaller");
        }

        Ok(v.finish()?)
    }
}

/// Uploads `image` to `endpoint` as a single `file` form field.
///
/// # Errors
///
/// [`ClientError::Validation`] for unsupported, empty or oversized files
/// (nothing is sent), the usual dispatch errors, and [`ClientError::Decode`]
/// when the endpoint's response does not carry a URL where it should.
pub async fn upload_image<T, S>(
    dispatcher: &Dispatcher<T, S>,
    endpoint: &UploadEndpoint,
    image: ImageFile,
) -> ClientResult<UploadedAsset>
where
    T: Transport,
    S: TokenStore,
{
    image.check()?;

    let form = MultipartForm::single_file(image.bytes, image.file_name, image.mime);
    let path = endpoint.path();
    let body = dispatcher.upload(&path, form).await?;

    endpoint
        .shape()
        .extract_url(&body)
        .map(|url| UploadedAsset {
            url: url.to_string(),
        })
        .ok_or_else(|| ClientError::decode(format!("upload response from {path} has no file URL")))
}
