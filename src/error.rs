//! Error handling and custom error types
//!
//! Provides unified error handling across the library using thiserror.

use crate::models::Capability;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Allocation failure: {0}")]
    Allocation(String),

    #[error("Invalid parameter: {0}")]
    Validation(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Capability disabled: {0}")]
    CapabilityDisabled(Capability),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures raised before any network I/O took place.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True when no usable reply body came back from the service.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Transport(_) | Error::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::Validation("temperature".to_string()).is_validation());
        assert!(!Error::Validation("temperature".to_string()).is_transport());
        assert!(Error::Transport("status 502".to_string()).is_transport());
        assert!(Error::MalformedResponse("eof".to_string()).is_transport());
        assert!(!Error::OpenAI("bad key".to_string()).is_transport());
    }

    #[test]
    fn test_capability_disabled_message() {
        let err = Error::CapabilityDisabled(Capability::ImageEdit);
        assert_eq!(err.to_string(), "Capability disabled: image_edit");
    }
}
