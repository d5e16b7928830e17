//! Shared test utilities for integration tests

// Each test file includes this module separately.
#![allow(dead_code)]

use assay_core::{LlmClient, LlmConfig};
use std::env;
use std::time::Duration;

/// API key for tests against the real Gemini API, if set.
pub fn get_api_key() -> Option<String> {
    env::var("GEMINI_API_KEY").ok()
}

/// Client pointed at the real API with small token budgets.
pub fn create_test_client(api_key: &str) -> LlmClient {
    let config = LlmConfig::default()
        .with_max_tokens(256)
        .with_temperature(0.0)
        .with_max_retries(1)
        .with_retry_base_delay_ms(500);
    LlmClient::new(api_key, config).expect("valid test client")
}

/// Client pointed at a mock server, with retries off.
pub fn create_mock_client(base_url: &str) -> LlmClient {
    let config = LlmConfig::default()
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_max_retries(0);
    LlmClient::new("test-key", config).expect("valid mock client")
}
