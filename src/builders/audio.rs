//! Speech-to-text builders. Both upload the caller's audio bytes as
//! `multipart/form-data` and return the transcript as a plain string.

use super::{check_not_empty, check_temperature};
use crate::encode::MultipartForm;
use crate::models::{AudioInputFormat, AudioResponseFormat};
use crate::openai::OpenAi;
use crate::response::parser;
use crate::Result;

const TRANSCRIPTIONS_PATH: &str = "/audio/transcriptions";
const TRANSLATIONS_PATH: &str = "/audio/translations";
pub const DEFAULT_AUDIO_MODEL: &str = "whisper-1";

#[derive(Debug, Clone)]
struct AudioParams {
    model: String,
    prompt: Option<String>,
    response_format: Option<AudioResponseFormat>,
    temperature: Option<f32>,
    language: Option<String>,
}

impl AudioParams {
    fn new() -> Self {
        Self {
            model: DEFAULT_AUDIO_MODEL.to_string(),
            prompt: None,
            response_format: None,
            temperature: None,
            language: None,
        }
    }

    fn send(
        &self,
        client: &OpenAi,
        path: &str,
        data: &[u8],
        format: AudioInputFormat,
    ) -> Result<String> {
        check_not_empty("audio", data)?;

        let body = MultipartForm::new()
            .file("file", format.file_name(), format.mime_type(), data)
            .text("model", &self.model)
            .optional_text("prompt", self.prompt.as_deref())
            .optional_text(
                "response_format",
                self.response_format.map(|f| f.as_str()),
            )
            .optional_text("temperature", self.temperature)
            .optional_text("language", self.language.as_deref())
            .encode()?;

        let reply = client.post(path, body)?;
        parser::transcript(&reply, self.response_format)
    }
}

/// Transcribes audio into the input language.
pub struct AudioTranscription<'a> {
    client: &'a OpenAi,
    params: AudioParams,
}

impl<'a> AudioTranscription<'a> {
    pub(crate) fn new(client: &'a OpenAi) -> Self {
        Self {
            client,
            params: AudioParams::new(),
        }
    }

    pub fn set_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.params.model = model.into();
        self
    }

    /// Text guiding the model's style or continuing a previous segment.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> &mut Self {
        self.params.prompt = Some(prompt.into());
        self
    }

    pub fn set_response_format(&mut self, format: AudioResponseFormat) -> &mut Self {
        self.params.response_format = Some(format);
        self
    }

    /// Between 0 and 1.
    pub fn set_temperature(&mut self, temperature: f32) -> &mut Self {
        self.params.temperature = Some(temperature);
        self
    }

    /// ISO-639-1 code of the spoken language; unset lets the service detect it.
    pub fn set_language(&mut self, language: impl Into<String>) -> &mut Self {
        self.params.language = Some(language.into());
        self
    }

    pub fn file(&self, data: &[u8], format: AudioInputFormat) -> Result<String> {
        check_temperature(self.params.temperature, 1.0)?;
        self.params.send(self.client, TRANSCRIPTIONS_PATH, data, format)
    }
}

/// Transcribes audio and translates it into English.
pub struct AudioTranslation<'a> {
    client: &'a OpenAi,
    params: AudioParams,
}

impl<'a> AudioTranslation<'a> {
    pub(crate) fn new(client: &'a OpenAi) -> Self {
        Self {
            client,
            params: AudioParams::new(),
        }
    }

    pub fn set_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.params.model = model.into();
        self
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> &mut Self {
        self.params.prompt = Some(prompt.into());
        self
    }

    pub fn set_response_format(&mut self, format: AudioResponseFormat) -> &mut Self {
        self.params.response_format = Some(format);
        self
    }

    /// Between 0 and 2.
    pub fn set_temperature(&mut self, temperature: f32) -> &mut Self {
        self.params.temperature = Some(temperature);
        self
    }

    pub fn file(&self, data: &[u8], format: AudioInputFormat) -> Result<String> {
        check_temperature(self.params.temperature, 2.0)?;
        self.params.send(self.client, TRANSLATIONS_PATH, data, format)
    }
}
