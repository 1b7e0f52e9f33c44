//! Dispatcher: shared credentials, base URL and enabled capabilities.
//!
//! Builders borrow the dispatcher, so it necessarily outlives every builder
//! created from it. Dropping a builder or a response releases it.

use crate::builders::{
    check_not_empty, AudioTranscription, AudioTranslation, ChatCompletion, Completion, Edit,
    ImageEdit, ImageGeneration, ImageVariation,
};
use crate::encode::{self, EncodedBody};
use crate::models::{Capabilities, Capability, Config};
use crate::response::{parser, EmbeddingResponse, ModerationResponse};
use crate::transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const EMBEDDINGS_PATH: &str = "/embeddings";
const MODERATIONS_PATH: &str = "/moderations";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'r> {
    input: &'r str,
    model: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'r str>,
}

#[derive(Debug, Serialize)]
struct ModerationRequest<'r> {
    input: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'r str>,
}

pub struct OpenAi {
    api_key: String,
    base_url: String,
    capabilities: Capabilities,
    transport: Box<dyn Transport>,
}

impl OpenAi {
    /// Dispatcher with every capability enabled and the default HTTPS transport.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&Config::new(api_key))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("api key is required".to_string()));
        }

        let transport = HttpTransport::new(config.timeout)?;
        let mut openai = Self::with_transport(config.api_key.clone(), transport)
            .with_capabilities(config.capabilities);
        if let Some(base_url) = &config.base_url {
            openai.set_base_url(base_url);
        }
        Ok(openai)
    }

    pub fn with_transport(api_key: impl Into<String>, transport: impl Transport + 'static) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            capabilities: Capabilities::all(),
            transport: Box::new(transport),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Points every later request at another API root, e.g. a proxy.
    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn require(&self, capability: Capability) -> Result<()> {
        if self.capabilities.contains(capability) {
            Ok(())
        } else {
            tracing::debug!("Rejected request for disabled capability {}", capability);
            Err(Error::CapabilityDisabled(capability))
        }
    }

    pub(crate) fn post(&self, path: &str, body: EncodedBody) -> Result<TransportResponse> {
        let request = TransportRequest {
            url: format!("{}{}", self.base_url, path),
            api_key: &self.api_key,
            content_type: body.content_type,
            body: body.bytes,
        };

        tracing::debug!(
            "Sending request to {} ({} bytes)",
            request.url,
            request.body.len()
        );

        self.transport.post(request)
    }

    /// Embeds `input` with `model` in a single call.
    pub fn embedding_create(
        &self,
        input: &str,
        model: &str,
        user: Option<&str>,
    ) -> Result<EmbeddingResponse> {
        self.require(Capability::Embedding)?;
        check_not_empty("input", input.as_bytes())?;
        check_not_empty("model", model.as_bytes())?;

        let body = encode::json(&EmbeddingRequest { input, model, user })?;
        let reply = self.post(EMBEDDINGS_PATH, body)?;
        parser::parse_reply(&reply, parser::embeddings)
    }

    /// Classifies `input` against the content policy.
    pub fn moderation_create(&self, input: &str, model: Option<&str>) -> Result<ModerationResponse> {
        self.require(Capability::Moderation)?;
        check_not_empty("input", input.as_bytes())?;

        let body = encode::json(&ModerationRequest { input, model })?;
        let reply = self.post(MODERATIONS_PATH, body)?;
        parser::parse_reply(&reply, parser::moderation_flags)
    }

    pub fn completion_create(&self) -> Result<Completion<'_>> {
        self.require(Capability::Completion)?;
        Ok(Completion::new(self))
    }

    pub fn chat_create(&self) -> Result<ChatCompletion<'_>> {
        self.require(Capability::ChatCompletion)?;
        Ok(ChatCompletion::new(self))
    }

    pub fn edit_create(&self) -> Result<Edit<'_>> {
        self.require(Capability::Edit)?;
        Ok(Edit::new(self))
    }

    pub fn image_generation_create(&self) -> Result<ImageGeneration<'_>> {
        self.require(Capability::ImageGeneration)?;
        Ok(ImageGeneration::new(self))
    }

    pub fn image_variation_create(&self) -> Result<ImageVariation<'_>> {
        self.require(Capability::ImageVariation)?;
        Ok(ImageVariation::new(self))
    }

    pub fn image_edit_create(&self) -> Result<ImageEdit<'_>> {
        self.require(Capability::ImageEdit)?;
        Ok(ImageEdit::new(self))
    }

    pub fn audio_transcription_create(&self) -> Result<AudioTranscription<'_>> {
        self.require(Capability::AudioTranscription)?;
        Ok(AudioTranscription::new(self))
    }

    pub fn audio_translation_create(&self) -> Result<AudioTranslation<'_>> {
        self.require(Capability::AudioTranslation)?;
        Ok(AudioTranslation::new(self))
    }
}

impl fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAi")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
