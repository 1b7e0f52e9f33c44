use super::conversation::ConversationLog;
use super::{check_penalty, check_stop, check_temperature, check_top_p};
use crate::encode;
use crate::models::{ChatMessage, Role, Stop};
use crate::openai::OpenAi;
use crate::response::{parser, StringResponse};
use crate::Result;
use serde::Serialize;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Serialize)]
struct ChatParams {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Stop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'r> {
    #[serde(flatten)]
    params: &'r ChatParams,
    messages: Vec<&'r ChatMessage>,
}

/// Chat session: each message is sent together with the system prompt and
/// the accumulated conversation.
pub struct ChatCompletion<'a> {
    client: &'a OpenAi,
    params: ChatParams,
    system: Option<ChatMessage>,
    conversation: ConversationLog,
}

impl<'a> ChatCompletion<'a> {
    pub(crate) fn new(client: &'a OpenAi) -> Self {
        Self {
            client,
            params: ChatParams {
                model: DEFAULT_CHAT_MODEL.to_string(),
                max_tokens: None,
                temperature: None,
                top_p: None,
                stop: None,
                presence_penalty: None,
                frequency_penalty: None,
                user: None,
            },
            system: None,
            conversation: ConversationLog::new(),
        }
    }

    pub fn set_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.params.model = model.into();
        self
    }

    /// Description of the required assistant, sent first on every request.
    pub fn set_system(&mut self, system: impl Into<String>) -> &mut Self {
        self.system = Some(ChatMessage::new(Role::System, system));
        self
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) -> &mut Self {
        self.params.max_tokens = Some(max_tokens);
        self
    }

    pub fn set_temperature(&mut self, temperature: f32) -> &mut Self {
        self.params.temperature = Some(temperature);
        self
    }

    pub fn set_top_p(&mut self, top_p: f32) -> &mut Self {
        self.params.top_p = Some(top_p);
        self
    }

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

    pub fn set_user(&mut self, user: impl Into<String>) -> &mut Self {
        self.params.user = Some(user.into());
        self
    }

    pub fn clear_conversation(&mut self) -> &mut Self {
        self.conversation.clear();
        self
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_ref().map(|m| m.content.as_str())
    }

    fn validate(&self) -> Result<()> {
        let p = &self.params;
        check_temperature(p.temperature, 2.0)?;
        check_top_p(p.top_p)?;
        check_penalty("presence_penalty", p.presence_penalty)?;
        check_penalty("frequency_penalty", p.frequency_penalty)?;
        check_stop(p.stop.as_ref())
    }

    /// Sends `prompt` as the next user turn.
    ///
    /// The user entry joins the conversation once the request is handed to
    /// the transport, and stays there if the call fails. With `save`, the
    /// first reply is appended as an assistant entry.
    pub fn message(&mut self, prompt: &str, save: bool) -> Result<StringResponse> {
        self.validate()?;

        let user = ChatMessage::new(Role::User, prompt);
        let body = encode::json(&ChatCompletionRequest {
            params: &self.params,
            messages: self
                .system
                .iter()
                .chain(self.conversation.iter())
                .chain(std::iter::once(&user))
                .collect(),
        })?;

        self.conversation.push(user);

        let reply = self.client.post(CHAT_COMPLETIONS_PATH, body)?;
        let response: StringResponse = parser::parse_reply(&reply, parser::chat_contents)?;

        if save {
            if let Some(text) = response.text(0) {
                self.conversation.push(ChatMessage::new(Role::Assistant, text));
            }
        }

        Ok(response)
    }
}
