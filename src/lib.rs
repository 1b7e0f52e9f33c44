//! Blocking OpenAI client for constrained devices
//!
//! A dispatcher holds the API key and hands out per-endpoint request builders.
//! Builders validate their parameters when triggered, encode JSON or multipart
//! bodies, and parse replies into owned, typed response objects.

pub mod builders;
pub mod encode;
pub mod error;
pub mod models;
pub mod openai;
pub mod response;
pub mod transport;

pub use error::{Error, Result};
pub use openai::OpenAi;
pub use response::{
    ApiResponse, EmbeddingData, EmbeddingResponse, ImageResponse, ModerationResponse,
    StringResponse,
};
