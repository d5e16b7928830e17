//! LLM client for the Gemini `generateContent` REST API.

use super::request::{Content, FunctionDeclaration, LlmRequest, LlmResponse, Part};
use crate::config::LlmConfig;
use crate::error::LlmError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// LLM client wrapping a `reqwest::Client` with timeout, retry and
/// configuration handling.
#[derive(Clone)]
pub struct LlmClient {
    /// Underlying HTTP client
    http: reqwest::Client,

    /// Gemini API key
    api_key: String,

    /// LLM configuration (model, timeout, tokens, temperature, etc.)
    config: LlmConfig,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"[REDACTED]")
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

impl LlmClient {
    /// Create a new LLM client.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] if the key is empty.
    pub fn new(api_key: impl Into<String>, config: LlmConfig) -> Result<Self, LlmError> {
        Self::with_http_client(reqwest::Client::new(), api_key, config)
    }

    /// Create a client sharing an existing `reqwest::Client`.
    pub fn with_http_client(
        http: reqwest::Client,
        api_key: impl Into<String>,
        config: LlmConfig,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey(
                "a Gemini API key is required (set GEMINI_API_KEY)".to_string(),
            ));
        }
        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    /// Get a reference to the LLM configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Generate a complete response.
    ///
    /// # Retry Behavior
    ///
    /// Transient failures (timeouts, rate limits, transport errors, 5xx) are
    /// retried up to `config.max_retries` times with exponential backoff
    /// starting at `config.retry_base_delay_ms`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `LlmError::InvalidRequest` if the request has no contents
    /// - `LlmError::Timeout` if a request exceeds `config.timeout`
    /// - `LlmError::Http` / `LlmError::RateLimit` for API errors
    /// - `LlmError::NoContent` if the response has no candidate content
    pub async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.validate_request(&request)?;

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.generate_once(&request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    log::warn!(
                        "LLM request failed (attempt {}/{}): {}, retrying...",
                        attempt + 1,
                        self.config.max_retries + 1,
                        e
                    );
                    last_error = Some(e);
                    tokio::time::sleep(self.config.retry_delay(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Other("Retry loop exited unexpectedly".to_string())))
    }

    /// Execute a single generate request (no retries)
    async fn generate_once(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );
        let body = self.build_body(request);
        let timeout_ms = self.config.timeout.as_millis() as u64;

        log::debug!("POST {} ({} turns)", url, request.contents.len());

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_transport_error(e, timeout_ms))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Self::map_transport_error(e, timeout_ms))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| crate::utils::truncate(&text, 500));
            if status.as_u16() == 429 {
                return Err(LlmError::RateLimit(message));
            }
            return Err(LlmError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: LlmResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::ResponseProcessing(e.to_string()))?;

        let has_parts = parsed
            .content()
            .is_some_and(|content| !content.parts.is_empty());
        if !has_parts {
            return Err(LlmError::NoContent);
        }

        Ok(parsed)
    }

    fn map_transport_error(error: reqwest::Error, timeout_ms: u64) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout(timeout_ms)
        } else {
            LlmError::from(error)
        }
    }

    /// Validate the request before processing
    fn validate_request(&self, request: &LlmRequest) -> Result<(), LlmError> {
        let has_payload = request.contents.iter().any(|content| {
            content.parts.iter().any(|part| {
                part.text.as_deref().is_some_and(|t| !t.is_empty())
                    || part.inline_data.is_some()
                    || part.function_call.is_some()
                    || part.function_response.is_some()
            })
        });
        if !has_payload {
            return Err(LlmError::InvalidRequest(
                "Prompt cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn build_body<'a>(&self, request: &'a LlmRequest) -> GenerateContentBody<'a> {
        let mut tools = Vec::new();
        if !request.functions.is_empty() {
            tools.push(json!({ "functionDeclarations": function_declarations(&request.functions) }));
        }
        if request.use_google_search {
            tools.push(json!({ "googleSearch": {} }));
        }

        GenerateContentBody {
            contents: &request.contents,
            system_instruction: request.system_instruction.as_ref().map(|system| Content {
                role: None,
                parts: vec![Part::text(system.clone())],
            }),
            tools,
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        }
    }
}

fn function_declarations(functions: &[FunctionDeclaration]) -> Value {
    serde_json::to_value(functions).unwrap_or_else(|e| {
        log::warn!("Failed to serialize function declarations: {}", e);
        Value::Array(vec![])
    })
}
