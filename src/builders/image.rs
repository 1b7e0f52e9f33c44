//! Image generation, variation and edit builders.
//!
//! Generation posts JSON; variation and edit upload the caller's image bytes
//! as `multipart/form-data`. Buffers are borrowed for a single call only.

use super::{check_count, check_not_empty};
use crate::encode::{self, mime, MultipartForm};
use crate::models::{ImageResponseFormat, ImageSize};
use crate::openai::OpenAi;
use crate::response::{parser, ImageResponse};
use crate::{Error, Result};
use serde::Serialize;

const GENERATIONS_PATH: &str = "/images/generations";
const VARIATIONS_PATH: &str = "/images/variations";
const EDITS_PATH: &str = "/images/edits";

/// Settings shared by the three image endpoints.
#[derive(Debug, Clone, Default, Serialize)]
struct ImageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<ImageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ImageResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

impl ImageParams {
    fn validate(&self) -> Result<()> {
        check_count(self.n)
    }

    fn append_to<'b>(&self, form: MultipartForm<'b>) -> MultipartForm<'b> {
        form.optional_text("n", self.n)
            .optional_text("size", self.size.map(|s| s.as_str()))
            .optional_text(
                "response_format",
                self.response_format.map(|f| f.as_str()),
            )
            .optional_text("user", self.user.as_deref())
    }
}

/// Adds `data` as an image file part named after its sniffed format.
fn image_part<'b>(form: MultipartForm<'b>, name: &'static str, data: &'b [u8]) -> MultipartForm<'b> {
    let kind = mime::sniff_image(data);
    form.file(name, kind.file_name(name), kind.mime, data)
}

macro_rules! image_setters {
    () => {
        pub fn set_size(&mut self, size: ImageSize) -> &mut Self {
            self.params.size = Some(size);
            self
        }

        pub fn set_response_format(&mut self, format: ImageResponseFormat) -> &mut Self {
            self.params.response_format = Some(format);
            self
        }

        /// Number of images to generate, 1 to 10.
        pub fn set_n(&mut self, n: u32) -> &mut Self {
            self.params.n = Some(n);
            self
        }

        pub fn set_user(&mut self, user: impl Into<String>) -> &mut Self {
            self.params.user = Some(user.into());
            self
        }
    };
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'r> {
    prompt: &'r str,
    #[serde(flatten)]
    params: &'r ImageParams,
}

/// Creates images from a text prompt.
pub struct ImageGeneration<'a> {
    client: &'a OpenAi,
    params: ImageParams,
}

impl<'a> ImageGeneration<'a> {
    pub(crate) fn new(client: &'a OpenAi) -> Self {
        Self {
            client,
            params: ImageParams::default(),
        }
    }

    image_setters!();

    pub fn prompt(&self, prompt: &str) -> Result<ImageResponse> {
        self.params.validate()?;
        check_not_empty("prompt", prompt.as_bytes())?;

        let body = encode::json(&GenerationRequest {
            prompt,
            params: &self.params,
        })?;
        let reply = self.client.post(GENERATIONS_PATH, body)?;
        parser::parse_reply(&reply, parser::images)
    }
}

/// Creates variations of a given image.
pub struct ImageVariation<'a> {
    client: &'a OpenAi,
    params: ImageParams,
}

impl<'a> ImageVariation<'a> {
    pub(crate) fn new(client: &'a OpenAi) -> Self {
        Self {
            client,
            params: ImageParams::default(),
        }
    }

    image_setters!();

    pub fn image(&self, data: &[u8]) -> Result<ImageResponse> {
        self.params.validate()?;
        check_not_empty("image", data)?;

        let form = image_part(MultipartForm::new(), "image", data);
        let body = self.params.append_to(form).encode()?;
        let reply = self.client.post(VARIATIONS_PATH, body)?;
        parser::parse_reply(&reply, parser::images)
    }
}

/// Edits or extends an image according to a prompt, optionally restricted
/// to the transparent area of a mask.
pub struct ImageEdit<'a> {
    client: &'a OpenAi,
    prompt: Option<String>,
    params: ImageParams,
}

impl<'a> ImageEdit<'a> {
    pub(crate) fn new(client: &'a OpenAi) -> Self {
        Self {
            client,
            prompt: None,
            params: ImageParams::default(),
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> &mut Self {
        self.prompt = Some(prompt.into());
        self
    }

    image_setters!();

    pub fn image(&self, data: &[u8], mask: Option<&[u8]>) -> Result<ImageResponse> {
        self.params.validate()?;
        check_not_empty("image", data)?;
        if let Some(mask) = mask {
            check_not_empty("mask", mask)?;
        }
        let prompt = self
            .prompt
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Validation("image edit requires a prompt".to_string()))?;

        let mut form = image_part(MultipartForm::new(), "image", data);
        if let Some(mask) = mask {
            form = image_part(form, "mask", mask);
        }
        let form = form.text("prompt", prompt);
        let body = self.params.append_to(form).encode()?;
        let reply = self.client.post(EDITS_PATH, body)?;
        parser::parse_reply(&reply, parser::images)
    }
}
