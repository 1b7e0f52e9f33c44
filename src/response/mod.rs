//! Typed response objects
//!
//! Every reply is parsed into one owned value holding either a result
//! collection or the service's error message, never both. Responses are
//! immutable once built and released when dropped.

pub(crate) mod parser;

use crate::{Error, Result};
use std::ops::Deref;

/// Accessors shared by every response kind.
pub trait ApiResponse {
    type Item;

    fn items(&self) -> &[Self::Item];

    /// Message from an `{"error":{"message":..}}` reply.
    fn error(&self) -> Option<&str>;

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    fn get(&self, index: usize) -> Option<&Self::Item> {
        self.items().get(index)
    }

    fn iter(&self) -> std::slice::Iter<'_, Self::Item> {
        self.items().iter()
    }

    fn is_error(&self) -> bool {
        self.error().is_some()
    }
}

/// Construction path used by the parser for error replies.
pub(crate) trait FromApiError {
    fn from_api_error(message: String) -> Self;
}

macro_rules! impl_api_response {
    ($ty:ident, $item:ty, $field:ident) => {
        impl ApiResponse for $ty {
            type Item = $item;

            fn items(&self) -> &[$item] {
                &self.$field
            }

            fn error(&self) -> Option<&str> {
                self.error.as_deref()
            }
        }

        impl FromApiError for $ty {
            fn from_api_error(message: String) -> Self {
                Self {
                    error: Some(message),
                    ..Self::default()
                }
            }
        }
    };
}

/// Generated texts from completion, chat and edit calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringResponse {
    texts: Vec<String>,
    usage: Option<u32>,
    error: Option<String>,
}

impl StringResponse {
    pub(crate) fn new(texts: Vec<String>, usage: Option<u32>) -> Self {
        Self {
            texts,
            usage,
            error: None,
        }
    }

    /// `usage.total_tokens` of the reply.
    pub fn usage(&self) -> Option<u32> {
        self.usage
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }

    pub fn into_texts(self) -> Vec<String> {
        self.texts
    }
}

impl_api_response!(StringResponse, String, texts);

/// Generated images, each either a URL or base64-encoded JSON payload
/// depending on the requested response format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageResponse {
    images: Vec<String>,
    error: Option<String>,
}

impl ImageResponse {
    pub(crate) fn new(images: Vec<String>) -> Self {
        Self {
            images,
            error: None,
        }
    }

    /// Decodes a `b64_json` item into raw image bytes.
    pub fn decode(&self, index: usize) -> Result<Vec<u8>> {
        use base64::Engine as _;

        let encoded = self.images.get(index).ok_or_else(|| {
            Error::Validation(format!(
                "image index {} out of range ({} images)",
                index,
                self.images.len()
            ))
        })?;

        Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
    }

    pub fn into_images(self) -> Vec<String> {
        self.images
    }
}

impl_api_response!(ImageResponse, String, images);

/// One embedding vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingData {
    values: Vec<f64>,
}

impl EmbeddingData {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

impl Deref for EmbeddingData {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingResponse {
    embeddings: Vec<EmbeddingData>,
    usage: Option<u32>,
    error: Option<String>,
}

impl EmbeddingResponse {
    pub(crate) fn new(embeddings: Vec<EmbeddingData>, usage: Option<u32>) -> Self {
        Self {
            embeddings,
            usage,
            error: None,
        }
    }

    pub fn usage(&self) -> Option<u32> {
        self.usage
    }

    pub fn into_embeddings(self) -> Vec<EmbeddingData> {
        self.embeddings
    }
}

impl_api_response!(EmbeddingResponse, EmbeddingData, embeddings);

/// Per-input `flagged` verdicts from the moderation endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModerationResponse {
    flags: Vec<bool>,
    error: Option<String>,
}

impl ModerationResponse {
    pub(crate) fn new(flags: Vec<bool>) -> Self {
        Self { flags, error: None }
    }

    pub fn is_flagged(&self, index: usize) -> Option<bool> {
        self.flags.get(index).copied()
    }

    pub fn any_flagged(&self) -> bool {
        self.flags.iter().any(|flagged| *flagged)
    }
}

impl_api_response!(ModerationResponse, bool, flags);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_has_no_items() {
        let response = StringResponse::from_api_error("invalid_api_key".to_string());
        assert!(response.is_error());
        assert_eq!(response.error(), Some("invalid_api_key"));
        assert_eq!(response.len(), 0);
        assert_eq!(response.usage(), None);
        assert!(response.get(0).is_none());
    }

    #[test]
    fn test_string_response_accessors() {
        let response = StringResponse::new(vec!["a".to_string(), "b".to_string()], Some(7));
        assert_eq!(response.len(), 2);
        assert_eq!(response.text(1), Some("b"));
        assert_eq!(response.usage(), Some(7));
        assert!(response.error().is_none());
        assert_eq!(response.into_texts(), vec!["a", "b"]);
    }

    #[test]
    fn test_image_decode() {
        let response = ImageResponse::new(vec!["iVBORw==".to_string(), "%%%".to_string()]);
        assert_eq!(response.decode(0).unwrap(), vec![0x89, 0x50, 0x4E, 0x47]);
        assert!(matches!(response.decode(1), Err(Error::Base64(_))));
        assert!(matches!(response.decode(2), Err(Error::Validation(_))));
    }

    #[test]
    fn test_embedding_data_derefs_to_slice() {
        let response = EmbeddingResponse::new(vec![EmbeddingData::new(vec![0.5, -1.0])], None);
        let data = response.get(0).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1], -1.0);
        assert_eq!(data.as_slice(), &[0.5, -1.0]);
    }

    #[test]
    fn test_moderation_flags() {
        let response = ModerationResponse::new(vec![false, true]);
        assert_eq!(response.is_flagged(0), Some(false));
        assert_eq!(response.is_flagged(1), Some(true));
        assert_eq!(response.is_flagged(2), None);
        assert!(response.any_flagged());
        assert_eq!(response.iter().filter(|f| **f).count(), 1);
    }
}
