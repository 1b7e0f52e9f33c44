//! Reply classification and payload extraction.
//!
//! Missing top-level payload fields yield empty collections and items without
//! the expected field are skipped. Fields of the wrong JSON type are treated
//! as a malformed reply.

use super::{
    EmbeddingData, EmbeddingResponse, FromApiError, ImageResponse, ModerationResponse,
    StringResponse,
};
use crate::models::AudioResponseFormat;
use crate::transport::TransportResponse;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Collections that are absent or `null` both decode as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    choices: Vec<TextChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct TextChoice {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    data: Vec<ImageData>,
}

/// One generated image item (URL or base64).
#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    data: Vec<EmbeddingItem>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: Option<usize>,
    embedding: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct ModerationReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    flagged: Option<bool>,
}

/// Classifies a reply and hands successful JSON bodies to `extract`.
///
/// An `error` object yields an error response whatever the HTTP status;
/// a non-2xx reply without one is a transport failure.
pub(crate) fn parse_reply<R, F>(reply: &TransportResponse, extract: F) -> Result<R>
where
    R: FromApiError,
    F: FnOnce(&Value) -> Result<R>,
{
    let value = parse_object(reply)?;

    if let Some(message) = error_message(&value) {
        tracing::warn!(
            "OpenAI API returned an error (status {}): {}",
            reply.status,
            message
        );
        return Ok(R::from_api_error(message));
    }

    if !reply.is_success() {
        tracing::error!("OpenAI API status {} without error body", reply.status);
        return Err(Error::Transport(format!(
            "status {} without error body",
            reply.status
        )));
    }

    extract(&value)
}

fn parse_object(reply: &TransportResponse) -> Result<Value> {
    let value: Value = serde_json::from_slice(&reply.body).map_err(|e| {
        tracing::error!(
            "Failed to parse OpenAI response (status {}): {}",
            reply.status,
            e
        );
        malformed(reply, e.to_string())
    })?;

    if !value.is_object() {
        return Err(malformed(reply, "top-level value is not an object".to_string()));
    }

    Ok(value)
}

fn malformed(reply: &TransportResponse, reason: String) -> Error {
    if reply.is_success() {
        Error::MalformedResponse(reason)
    } else {
        Error::Transport(format!("status {}: {}", reply.status, reason))
    }
}

/// Message of a non-null `error` field, falling back to its raw JSON text.
fn error_message(value: &Value) -> Option<String> {
    let error = value.get("error").filter(|e| !e.is_null())?;
    Some(match error.get("message").and_then(Value::as_str) {
        Some(message) => message.to_string(),
        None => match error.as_str() {
            Some(text) => text.to_string(),
            None => error.to_string(),
        },
    })
}

fn decode<'v, T: Deserialize<'v>>(value: &'v Value) -> Result<T> {
    T::deserialize(value).map_err(|e| {
        tracing::error!("Unexpected OpenAI response shape: {}", e);
        Error::MalformedResponse(e.to_string())
    })
}

fn total_tokens(usage: Option<Usage>) -> Option<u32> {
    usage.and_then(|u| u.total_tokens)
}

/// `choices[].text`, used by completions and edits.
pub(crate) fn completion_texts(value: &Value) -> Result<StringResponse> {
    let reply: CompletionReply = decode(value)?;
    let texts = reply.choices.into_iter().filter_map(|c| c.text).collect();
    Ok(StringResponse::new(texts, total_tokens(reply.usage)))
}

/// `choices[].message.content`.
pub(crate) fn chat_contents(value: &Value) -> Result<StringResponse> {
    let reply: ChatReply = decode(value)?;
    let texts = reply
        .choices
        .into_iter()
        .filter_map(|c| c.message.and_then(|m| m.content))
        .collect();
    Ok(StringResponse::new(texts, total_tokens(reply.usage)))
}

pub(crate) fn images(value: &Value) -> Result<ImageResponse> {
    let reply: ImageReply = decode(value)?;
    let images = reply
        .data
        .into_iter()
        .filter_map(|item| item.b64_json.or(item.url))
        .collect();
    Ok(ImageResponse::new(images))
}

pub(crate) fn embeddings(value: &Value) -> Result<EmbeddingResponse> {
    let reply: EmbeddingReply = decode(value)?;

    let mut items = reply.data;
    if items.iter().all(|item| item.index.is_some()) {
        items.sort_by_key(|item| item.index);
    }

    let embeddings = items
        .into_iter()
        .filter_map(|item| item.embedding.map(EmbeddingData::new))
        .collect();
    Ok(EmbeddingResponse::new(embeddings, total_tokens(reply.usage)))
}

pub(crate) fn moderation_flags(value: &Value) -> Result<ModerationResponse> {
    let reply: ModerationReply = decode(value)?;
    let flags = reply.results.into_iter().filter_map(|r| r.flagged).collect();
    Ok(ModerationResponse::new(flags))
}

/// Transcript text of an audio reply.
///
/// JSON formats yield the `text` field; `verbose_json`, `text`, `srt` and
/// `vtt` yield the body as returned. Error bodies become [`Error::OpenAI`].
pub(crate) fn transcript(
    reply: &TransportResponse,
    format: Option<AudioResponseFormat>,
) -> Result<String> {
    let json_text = matches!(format, None | Some(AudioResponseFormat::Json));
    let json_family = json_text || format == Some(AudioResponseFormat::VerboseJson);

    if !reply.is_success() || json_family {
        if let Ok(value) = serde_json::from_slice::<Value>(&reply.body) {
            if let Some(message) = error_message(&value) {
                tracing::warn!(
                    "OpenAI audio API returned an error (status {}): {}",
                    reply.status,
                    message
                );
                return Err(Error::OpenAI(message));
            }
        }
    }

    if !reply.is_success() {
        tracing::error!("OpenAI audio API status {} without error body", reply.status);
        return Err(Error::Transport(format!(
            "status {} without error body",
            reply.status
        )));
    }

    if json_text {
        let value = parse_object(reply)?;
        return Ok(value
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string());
    }

    String::from_utf8(reply.body.clone())
        .map_err(|e| Error::MalformedResponse(format!("transcript is not UTF-8: {}", e)))
}
