//! Request encoder
//!
//! Turns a builder's parameter snapshot into a request body plus content type.
//! JSON for text endpoints, `multipart/form-data` for image and audio uploads.

pub mod mime;
pub mod multipart;

pub use multipart::MultipartForm;

use crate::{Error, Result};
use serde::Serialize;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serialized body ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Encodes a request payload as JSON. Unset optional fields must be marked
/// `skip_serializing_if = "Option::is_none"` on the payload type.
pub fn json<T: Serialize>(payload: &T) -> Result<EncodedBody> {
    let bytes = serde_json::to_vec(payload).map_err(|e| {
        tracing::error!("Failed to encode request body: {}", e);
        Error::Serialization(e)
    })?;

    Ok(EncodedBody {
        content_type: JSON_CONTENT_TYPE.to_string(),
        bytes,
    })
}
