use super::{check_count, check_not_empty, check_temperature, check_top_p};
use crate::encode;
use crate::openai::OpenAi;
use crate::response::{parser, StringResponse};
use crate::Result;
use serde::Serialize;

const EDITS_PATH: &str = "/edits";
pub const DEFAULT_EDIT_MODEL: &str = "text-davinci-edit-001";

#[derive(Debug, Clone, Serialize)]
struct EditParams {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<u32>,
}

#[derive(Debug, Serialize)]
struct EditRequest<'r> {
    #[serde(flatten)]
    params: &'r EditParams,
    instruction: &'r str,
    input: &'r str,
}

/// Given an input text and an instruction, returns edited versions of the input.
pub struct Edit<'a> {
    client: &'a OpenAi,
    params: EditParams,
}

impl<'a> Edit<'a> {
    pub(crate) fn new(client: &'a OpenAi) -> Self {
        Self {
            client,
            params: EditParams {
                model: DEFAULT_EDIT_MODEL.to_string(),
                temperature: None,
                top_p: None,
                n: None,
            },
        }
    }

    pub fn set_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.params.model = model.into();
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

    /// Number of edits to generate for the input and instruction.
    pub fn set_n(&mut self, n: u32) -> &mut Self {
        self.params.n = Some(n);
        self
    }

    pub fn process(&self, instruction: &str, input: &str) -> Result<StringResponse> {
        check_temperature(self.params.temperature, 2.0)?;
        check_top_p(self.params.top_p)?;
        check_count(self.params.n)?;
        check_not_empty("instruction", instruction.as_bytes())?;

        let body = encode::json(&EditRequest {
            params: &self.params,
            instruction,
            input,
        })?;
        let reply = self.client.post(EDITS_PATH, body)?;
        parser::parse_reply(&reply, parser::completion_texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;

    #[test]
    fn test_process_sends_instruction_and_input() {
        let mock = MockTransport::new().with_json(json!({
            "object": "edit",
            "choices": [{"text": "What day of the week is it?\n", "index": 0}],
            "usage": {"total_tokens": 32}
        }));
        let openai = OpenAi::with_transport("sk-test", mock.clone());
        let mut edit = openai.edit_create().unwrap();
        edit.set_n(1);

        let response = edit
            .process("Fix the spelling mistakes", "What day of the wek is it?")
            .unwrap();

        assert_eq!(response.text(0), Some("What day of the week is it?\n"));
        assert_eq!(response.usage(), Some(32));

        let request = mock.last_request().unwrap();
        assert!(request.url.ends_with("/edits"));
        assert_eq!(
            request.json(),
            json!({
                "model": DEFAULT_EDIT_MODEL,
                "instruction": "Fix the spelling mistakes",
                "input": "What day of the wek is it?",
                "n": 1
            })
        );
    }

    #[test]
    fn test_process_sends_every_set_field() {
        let mock = MockTransport::new().with_json(json!({"choices": [{"text": "ok"}]}));
        let openai = OpenAi::with_transport("sk-test", mock.clone());
        let mut edit = openai.edit_create().unwrap();
        edit.set_model("code-davinci-edit-001")
            .set_temperature(0.25)
            .set_top_p(0.75)
            .set_n(3);

        edit.process("Add a docstring", "fn main() {}").unwrap();

        assert_eq!(
            mock.last_request().unwrap().json(),
            json!({
                "model": "code-davinci-edit-001",
                "temperature": 0.25,
                "top_p": 0.75,
                "n": 3,
                "instruction": "Add a docstring",
                "input": "fn main() {}"
            })
        );
    }

    #[test]
    fn test_process_validates_before_sending() {
        let mock = MockTransport::new();
        let openai = OpenAi::with_transport("sk-test", mock.clone());
        let mut edit = openai.edit_create().unwrap();

        assert!(edit.process("", "text").unwrap_err().is_validation());

        edit.set_n(11);
        assert!(edit.process("Fix it", "text").unwrap_err().is_validation());

        assert_eq!(mock.call_count(), 0);
    }
}
