//! Shared test utilities for integration tests

#![allow(dead_code)]

use assay_core::{AgentContext, LlmClient, LlmConfig};
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

pub const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

/// Helper to get the API key, or return None if not available.
pub fn get_api_key() -> Option<String> {
    env::var("GEMINI_API_KEY").ok()
}

/// Context talking to the real Gemini API.
pub fn create_test_context(api_key: &str) -> AgentContext {
    let config = LlmConfig::default()
        .with_timeout(Duration::from_secs(60))
        .with_max_tokens(4096)
        .with_max_retries(1)
        .with_retry_base_delay_ms(500);
    AgentContext::new(LlmClient::new(api_key, config).expect("valid client"))
}

/// Context talking to a mock server, retries off.
pub fn create_mock_context(base_url: &str) -> AgentContext {
    let config = LlmConfig::default()
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_max_retries(0);
    AgentContext::new(LlmClient::new("test-key", config).expect("valid client"))
}

fn candidate(parts: Value, tokens: u32) -> String {
    json!({
        "candidates": [{"content": {"role": "model", "parts": parts}}],
        "usageMetadata": {"totalTokenCount": tokens}
    })
    .to_string()
}

/// Response body with a single text part.
pub fn text_reply(text: &str, tokens: u32) -> String {
    candidate(json!([{"text": text}]), tokens)
}

/// Response body requesting one function call.
pub fn function_call_reply(name: &str, args: Value, tokens: u32) -> String {
    candidate(json!([{"functionCall": {"name": name, "args": args}}]), tokens)
}
