//! Request shaping for the correction endpoint.
//!
//! [`CorrectionRequest`] holds everything sent for one call.  It serialises
//! into either the `/api/chat` body (system + user messages) or the
//! `/api/generate` body (`system` + `prompt`), depending on [`Endpoint`].

use serde::Serialize;

use crate::config::{Endpoint, LlmConfig};

/// Instruction sent with every request.
pub const CORRECTION_INSTRUCTION: &str = "\
You are a proofreader. Correct the grammar and spelling of the user's text.
Rules:
1. Fix grammar, spelling and punctuation mistakes only.
2. Keep the original meaning, wording, tone and language.
3. Reply with ONLY the corrected text: no commentary, explanations, quotes or labels.
4. If the text is already correct, return it unchanged.";

/// One message in a chat-style request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

/// Everything needed to ask the endpoint for one correction.
///
/// Fields are private; the request cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionRequest {
    model: String,
    instruction: String,
    text: String,
    stream: bool,
}

/// Serialisable request body, borrowed from a [`CorrectionRequest`].
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestBody<'a> {
    Chat(ChatBody<'a>),
    Generate(GenerateBody<'a>),
}

#[derive(Debug, Serialize)]
pub struct ChatBody<'a> {
    model: &'a str,
    stream: bool,
    messages: [ChatMessage; 2],
}

#[derive(Debug, Serialize)]
pub struct GenerateBody<'a> {
    model: &'a str,
    stream: bool,
    system: &'a str,
    prompt: &'a str,
}

impl CorrectionRequest {
    pub fn new(model: &str, instruction: &str, text: &str, stream: bool) -> Self {
        Self {
            model: model.to_string(),
            instruction: instruction.to_string(),
            text: text.to_string(),
            stream,
        }
    }

    /// Build a request for `text` with the model and stream flag from
    /// `config` and the standard [`CORRECTION_INSTRUCTION`].
    pub fn from_config(config: &LlmConfig, text: &str) -> Self {
        Self::new(
            &config.model,
            CORRECTION_INSTRUCTION,
            text,
            config.response_mode.stream_flag(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn stream(&self) -> bool {
        self.stream
    }

    /// Body for the given endpoint.
    pub fn body(&self, endpoint: Endpoint) -> RequestBody<'_> {
        match endpoint {
            Endpoint::Chat => RequestBody::Chat(ChatBody {
                model: &self.model,
                stream: self.stream,
                messages: [
                    ChatMessage::new("system", &self.instruction),
                    ChatMessage::new("user", &self.text),
                ],
            }),
            Endpoint::Generate => RequestBody::Generate(GenerateBody {
                model: &self.model,
                stream: self.stream,
                system: &self.instruction,
                prompt: &self.text,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseMode;
    use serde_json::json;

    fn to_json(req: &CorrectionRequest, endpoint: Endpoint) -> serde_json::Value {
        serde_json::to_value(req.body(endpoint)).unwrap()
    }

    #[test]
    fn chat_body_matches_wire_contract() {
        let req = CorrectionRequest::new("mistral", "fix it", "Their are", false);
        assert_eq!(
            to_json(&req, Endpoint::Chat),
            json!({
                "model": "mistral",
                "stream": false,
                "messages": [
                    { "role": "system", "content": "fix it" },
                    { "role": "user", "content": "Their are" }
                ]
            })
        );
    }

    #[test]
    fn generate_body_matches_wire_contract() {
        let req = CorrectionRequest::new("mistral", "fix it", "Their are", true);
        assert_eq!(
            to_json(&req, Endpoint::Generate),
            json!({
                "model": "mistral",
                "stream": true,
                "system": "fix it",
                "prompt": "Their are"
            })
        );
    }

    #[test]
    fn from_config_uses_model_and_stream_flag() {
        let mut config = LlmConfig::default();
        config.model = "llama3".into();
        config.response_mode = ResponseMode::Lines;

        let req = CorrectionRequest::from_config(&config, "hello wrld");
        assert_eq!(req.model(), "llama3");
        assert!(req.stream());
        assert_eq!(req.text(), "hello wrld");
        assert_eq!(req.instruction(), CORRECTION_INSTRUCTION);
    }

    #[test]
    fn target_text_is_sent_unmodified() {
        let raw = "  leading spaces and \"quotes\"\n";
        let req = CorrectionRequest::new("m", "i", raw, false);
        assert_eq!(to_json(&req, Endpoint::Chat)["messages"][1]["content"], raw);
    }

    #[test]
    fn instruction_forbids_commentary() {
        assert!(CORRECTION_INSTRUCTION.contains("grammar"));
        assert!(CORRECTION_INSTRUCTION.contains("spelling"));
        assert!(CORRECTION_INSTRUCTION.contains("no commentary"));
    }
}
