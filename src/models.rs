//! Data models and structures
//!
//! Wire-level enums and value types shared by the request builders, plus the
//! capability set and environment configuration of the dispatcher.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Author of one conversation entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Chat message object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Stop sequences; the service accepts a single string or up to 4 strings.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Stop {
    One(String),
    Many(Vec<String>),
}

impl Stop {
    pub const MAX_SEQUENCES: usize = 4;

    pub fn sequences(&self) -> Vec<&str> {
        match self {
            Stop::One(s) => vec![s.as_str()],
            Stop::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Stop {
    fn from(s: &str) -> Self {
        Stop::One(s.to_string())
    }
}

impl From<String> for Stop {
    fn from(s: String) -> Self {
        Stop::One(s)
    }
}

impl From<Vec<String>> for Stop {
    fn from(v: Vec<String>) -> Self {
        Stop::Many(v)
    }
}

impl From<&[&str]> for Stop {
    fn from(v: &[&str]) -> Self {
        Stop::Many(v.iter().map(|s| (*s).to_string()).collect())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1024x1024")]
    S1024x1024,
    #[serde(rename = "512x512")]
    S512x512,
    #[serde(rename = "256x256")]
    S256x256,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::S1024x1024 => "1024x1024",
            ImageSize::S512x512 => "512x512",
            ImageSize::S256x256 => "256x256",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageResponseFormat {
    #[default]
    Url,
    B64Json,
}

impl ImageResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageResponseFormat::Url => "url",
            ImageResponseFormat::B64Json => "b64_json",
        }
    }
}

/// Format of the transcript returned by the audio endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AudioResponseFormat {
    #[default]
    Json,
    Text,
    Srt,
    VerboseJson,
    Vtt,
}

impl AudioResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioResponseFormat::Json => "json",
            AudioResponseFormat::Text => "text",
            AudioResponseFormat::Srt => "srt",
            AudioResponseFormat::VerboseJson => "verbose_json",
            AudioResponseFormat::Vtt => "vtt",
        }
    }
}

/// Container format of caller-supplied audio bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioInputFormat {
    Mp3,
    Mp4,
    Mpeg,
    Mpga,
    M4a,
    Wav,
    Webm,
}

impl AudioInputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioInputFormat::Mp3 => "mp3",
            AudioInputFormat::Mp4 => "mp4",
            AudioInputFormat::Mpeg => "mpeg",
            AudioInputFormat::Mpga => "mpga",
            AudioInputFormat::M4a => "m4a",
            AudioInputFormat::Wav => "wav",
            AudioInputFormat::Webm => "webm",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioInputFormat::Mp3 | AudioInputFormat::Mpeg | AudioInputFormat::Mpga => {
                "audio/mpeg"
            }
            AudioInputFormat::Mp4 => "audio/mp4",
            AudioInputFormat::M4a => "audio/x-m4a",
            AudioInputFormat::Wav => "audio/x-wav",
            AudioInputFormat::Webm => "audio/webm",
        }
    }

    pub fn file_name(&self) -> String {
        format!("audio.{}", self.extension())
    }
}

impl FromStr for AudioInputFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(AudioInputFormat::Mp3),
            "mp4" => Ok(AudioInputFormat::Mp4),
            "mpeg" => Ok(AudioInputFormat::Mpeg),
            "mpga" => Ok(AudioInputFormat::Mpga),
            "m4a" => Ok(AudioInputFormat::M4a),
            "wav" => Ok(AudioInputFormat::Wav),
            "webm" => Ok(AudioInputFormat::Webm),
            other => Err(crate::Error::Config(format!(
                "Unknown audio format '{}'",
                other
            ))),
        }
    }
}

/// One endpoint family the dispatcher can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Embedding,
    Moderation,
    Completion,
    ChatCompletion,
    Edit,
    ImageGeneration,
    ImageVariation,
    ImageEdit,
    AudioTranscription,
    AudioTranslation,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::Embedding,
        Capability::Moderation,
        Capability::Completion,
        Capability::ChatCompletion,
        Capability::Edit,
        Capability::ImageGeneration,
        Capability::ImageVariation,
        Capability::ImageEdit,
        Capability::AudioTranscription,
        Capability::AudioTranslation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Capability::Embedding => "embedding",
            Capability::Moderation => "moderation",
            Capability::Completion => "completion",
            Capability::ChatCompletion => "chat_completion",
            Capability::Edit => "edit",
            Capability::ImageGeneration => "image_generation",
            Capability::ImageVariation => "image_variation",
            Capability::ImageEdit => "image_edit",
            Capability::AudioTranscription => "audio_transcription",
            Capability::AudioTranslation => "audio_translation",
        }
    }

    fn bit(&self) -> u16 {
        1 << (*self as u16)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| crate::Error::Config(format!("Unknown capability '{}'", s.trim())))
    }
}

/// Set of endpoint families enabled on a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    bits: u16,
}

impl Capabilities {
    pub fn all() -> Self {
        Capability::ALL
            .iter()
            .fold(Self::none(), |set, cap| set.with(*cap))
    }

    pub fn none() -> Self {
        Self { bits: 0 }
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.bits |= capability.bit();
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.bits &= !capability.bit();
        self
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.bits & capability.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), |set, cap| set.with(cap))
    }
}

impl FromStr for Capabilities {
    type Err = crate::Error;

    /// Parses a comma-separated list such as `chat_completion,embedding`.
    /// `all` enables every capability.
    fn from_str(s: &str) -> crate::Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }
        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Capability::from_str)
            .collect()
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub capabilities: Capabilities,
}

impl Config {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: Self::DEFAULT_TIMEOUT,
            capabilities: Capabilities::all(),
        }
    }

    /// Reads `OPENAI_*` variables, loading `.env` first when one exists.
    pub fn from_env() -> crate::Result<Self> {
        dotenv_loaded(dotenvy::dotenv())?;

        let timeout = match std::env::var("OPENAI_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                crate::Error::Config(format!("OPENAI_TIMEOUT_SECS is not a number: {}", raw))
            })?),
            Err(_) => Self::DEFAULT_TIMEOUT,
        };

        let capabilities = match std::env::var("OPENAI_CAPABILITIES") {
            Ok(raw) => raw.parse()?,
            Err(_) => Capabilities::all(),
        };

        Ok(Self {
            api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| crate::Error::Config("OPENAI_API_KEY not set".to_string()))?,
            base_url: std::env::var("OPENAI_BASE_URL").ok(),
            timeout,
            capabilities,
        })
    }
}

/// A missing `.env` file is fine; an unreadable or malformed one is not.
fn dotenv_loaded<T>(result: std::result::Result<T, dotenvy::Error>) -> crate::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
