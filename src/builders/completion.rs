use super::{check_best_of, check_count, check_penalty, check_stop, check_temperature, check_top_p};
use crate::encode;
use crate::models::Stop;
use crate::openai::OpenAi;
use crate::response::{parser, StringResponse};
use crate::Result;
use serde::Serialize;

const COMPLETIONS_PATH: &str = "/completions";
pub const DEFAULT_COMPLETION_MODEL: &str = "text-davinci-003";

#[derive(Debug, Clone, Serialize)]
struct CompletionParams {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    echo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Stop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_of: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'r> {
    #[serde(flatten)]
    params: &'r CompletionParams,
    prompt: &'r str,
}

/// Given a prompt, the model returns one or more predicted completions.
pub struct Completion<'a> {
    client: &'a OpenAi,
    params: CompletionParams,
}

impl<'a> Completion<'a> {
    pub(crate) fn new(client: &'a OpenAi) -> Self {
        Self {
            client,
            params: CompletionParams {
                model: DEFAULT_COMPLETION_MODEL.to_string(),
                max_tokens: None,
                temperature: None,
                top_p: None,
                n: None,
                echo: None,
                stop: None,
                presence_penalty: None,
                frequency_penalty: None,
                best_of: None,
                user: None,
            },
        }
    }

    pub fn set_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.params.model = model.into();
        self
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) -> &mut Self {
        self.params.max_tokens = Some(max_tokens);
        self
    }

    /// Between 0 and 2. Higher values give more random results.
    pub fn set_temperature(&mut self, temperature: f32) -> &mut Self {
        self.params.temperature = Some(temperature);
        self
    }

    /// Between 0 and 1. Alter this or temperature, not both.
    pub fn set_top_p(&mut self, top_p: f32) -> &mut Self {
        self.params.top_p = Some(top_p);
        self
    }

    /// Number of completions to generate for each prompt.
    pub fn set_n(&mut self, n: u32) -> &mut Self {
        self.params.n = Some(n);
        self
    }

    /// Echo back the prompt in addition to the completion.
    pub fn set_echo(&mut self, echo: bool) -> &mut Self {
        self.params.echo = Some(echo);
        self
    }

    /// Up to 4 sequences where the API stops generating further tokens.
    pub fn set_stop(&mut self, stop: impl Into<Stop>) -> &mut Self {
        self.params.stop = Some(stop.into());
        self
    }

    pub fn set_presence_penalty(&mut self, penalty: f32) -> &mut Self {
        self.params.presence_penalty = Some(penalty);
        self
    }

    pub fn set_frequency_penalty(&mut self, penalty: f32) -> &mut Self {
        self.params.frequency_penalty = Some(penalty);
        self
    }

    /// Completions generated server-side; must be greater than `n`.
    pub fn set_best_of(&mut self, best_of: u32) -> &mut Self {
        self.params.best_of = Some(best_of);
        self
    }

    pub fn set_user(&mut self, user: impl Into<String>) -> &mut Self {
        self.params.user = Some(user.into());
        self
    }

    fn validate(&self) -> Result<()> {
        let p = &self.params;
        check_temperature(p.temperature, 2.0)?;
        check_top_p(p.top_p)?;
        check_count(p.n)?;
        check_penalty("presence_penalty", p.presence_penalty)?;
        check_penalty("frequency_penalty", p.frequency_penalty)?;
        check_best_of(p.best_of, p.n)?;
        check_stop(p.stop.as_ref())
    }

    /// Sends `prompt` for completion.
    pub fn prompt(&self, prompt: &str) -> Result<StringResponse> {
        self.validate()?;

        let body = encode::json(&CompletionRequest {
            params: &self.params,
            prompt,
        })?;
        let reply = self.client.post(COMPLETIONS_PATH, body)?;
        parser::parse_reply(&reply, parser::completion_texts)
    }
}
