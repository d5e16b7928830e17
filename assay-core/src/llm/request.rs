//! Request and response types for the Gemini `generateContent` API.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role used for user turns (including function responses).
pub const ROLE_USER: &str = "user";

/// Role used for model turns.
pub const ROLE_MODEL: &str = "model";

/// One turn of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some(ROLE_USER.to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// A user turn carrying arbitrary parts.
    pub fn user_parts(parts: Vec<Part>) -> Self {
        Self {
            role: Some(ROLE_USER.to_string()),
            parts,
        }
    }
}

/// A single part of a [`Content`].
///
/// Exactly one of the payload fields is expected to be set. Unknown fields
/// returned by the API are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    /// Set on reasoning parts by thinking models; never user-visible text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    /// Opaque signature that must be echoed back with function calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Binary payload, base64-encoded for the wire.
    pub fn inline_data(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
            }),
            ..Default::default()
        }
    }

    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self {
            function_response: Some(FunctionResponse {
                name: name.into(),
                response,
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// The result of a function call, sent back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

/// A function the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Request to the LLM.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct LlmRequest {
    /// Conversation turns, oldest first
    pub contents: Vec<Content>,

    /// Optional system instruction
    pub system_instruction: Option<String>,

    /// Functions the model may call
    pub functions: Vec<FunctionDeclaration>,

    /// Enable Google Search grounding
    pub use_google_search: bool,

    /// Model override for this request only
    pub model: Option<String>,
}

impl LlmRequest {
    /// Create a single-turn request from a user prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            ..Default::default()
        }
    }

    /// Create a request with a system instruction.
    pub fn with_system(prompt: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            system_instruction: Some(system.into()),
            ..Default::default()
        }
    }

    /// Create a request from an existing conversation.
    pub fn from_contents(contents: Vec<Content>) -> Self {
        Self {
            contents,
            ..Default::default()
        }
    }

    /// Set the system instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, system: impl Into<String>) -> Self {
        self.system_instruction = Some(system.into());
        self
    }

    /// Attach binary data (image, audio) to the last user turn.
    #[must_use]
    pub fn with_inline_data(mut self, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        let part = Part::inline_data(mime_type, bytes);
        match self.contents.last_mut() {
            Some(content) => content.parts.push(part),
            None => self.contents.push(Content::user_parts(vec![part])),
        }
        self
    }

    /// Expose functions to the model.
    #[must_use]
    pub fn with_functions(mut self, functions: Vec<FunctionDeclaration>) -> Self {
        self.functions = functions;
        self
    }

    /// Enable Google Search grounding for real-time web information.
    #[must_use]
    pub fn with_google_search(mut self) -> Self {
        self.use_google_search = true;
        self
    }

    /// Use a different model for this request.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Token accounting returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
    #[serde(default)]
    pub total_token_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response from the LLM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

impl LlmResponse {
    /// Content of the first candidate, if any.
    pub fn content(&self) -> Option<&Content> {
        self.candidates.first().and_then(|c| c.content.as_ref())
    }

    /// Concatenated visible text of the first candidate.
    ///
    /// Returns `None` when the candidate has no text parts.
    pub fn text(&self) -> Option<String> {
        let content = self.content()?;
        let texts: Vec<&str> = content
            .parts
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// Function calls requested by the first candidate, in order.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.content()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.function_call.as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total token count, if the API reported usage.
    pub fn total_tokens(&self) -> Option<u32> {
        self.usage_metadata
            .as_ref()
            .and_then(|u| u.total_token_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_llm_request_new() {
        let request = LlmRequest::new("Hello");
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role.as_deref(), Some(ROLE_USER));
        assert_eq!(request.contents[0].parts[0].text.as_deref(), Some("Hello"));
        assert!(request.system_instruction.is_none());
        assert!(!request.use_google_search);
    }

    #[test]
    fn test_llm_request_with_system_and_google_search() {
        let request = LlmRequest::with_system("Q", "Be brief").with_google_search();
        assert_eq!(request.system_instruction.as_deref(), Some("Be brief"));
        assert!(request.use_google_search);
    }

    #[test]
    fn test_with_inline_data_attaches_to_last_turn() {
        let request = LlmRequest::new("Describe").with_inline_data("image/png", b"abc");
        assert_eq!(request.contents.len(), 1);
        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        let inline = parts[1].inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "YWJj");
    }

    #[test]
    fn test_part_serialization_is_camel_case_and_sparse() {
        let part = Part::function_response("calculator", json!({"result": "4"}));
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(
            value,
            json!({"functionResponse": {"name": "calculator", "response": {"result": "4"}}})
        );
    }

    #[test]
    fn test_response_text_skips_thoughts() {
        let response: LlmResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "thinking...", "thought": true},
                        {"text": "Paris"}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"totalTokenCount": 42}
        }))
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("Paris"));
        assert_eq!(response.total_tokens(), Some(42));
        assert!(response.function_calls().is_empty());
    }

    #[test]
    fn test_response_function_calls() {
        let response: LlmResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"functionCall": {"name": "calculator", "args": {"expression": "2+2"}}},
                        {"functionCall": {"name": "web_search", "args": {"query": "rust"}}}
                    ]
                }
            }]
        }))
        .unwrap();

        let calls = response.function_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "calculator");
        assert_eq!(calls[0].args["expression"], "2+2");
        assert!(response.text().is_none());
        assert!(response.total_tokens().is_none());
    }

    #[test]
    fn test_empty_response() {
        let response: LlmResponse = serde_json::from_str("{}").unwrap();
        assert!(response.content().is_none());
        assert!(response.text().is_none());
    }
}
