//! HTTP client for the scoring service.

use crate::config::EvalConfig;
use crate::error::{ErrorDetail, FetchError, SubmitError};
use crate::types::{QuestionItem, ScoreReport, SubmissionPayload};
use assay_core::prefix_chars;
use serde_json::Value;

/// Longest slice of an unexpected response body kept in messages.
const BODY_EXCERPT_CHARS: usize = 500;

/// Client for the question and submission endpoints.
///
/// No request is retried; every failure is reported once.
#[derive(Debug, Clone)]
pub struct ScoringClient {
    http: reqwest::Client,
    config: EvalConfig,
}

impl ScoringClient {
    pub fn new(config: EvalConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    /// Create a client sharing an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, config: EvalConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// The underlying HTTP client, shared with the attachment fetcher.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Fetch the question list.
    ///
    /// # Errors
    ///
    /// One [`FetchError`] variant per failure: transport, non-2xx status,
    /// undecodable body, empty list.
    pub async fn fetch_questions(&self) -> Result<Vec<QuestionItem>, FetchError> {
        let url = self.config.questions_url();
        log::info!("Fetching questions from: {}", url);

        let response = self
            .http
            .get(&url)
            .timeout(self.config.questions_timeout)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let questions: Vec<QuestionItem> = serde_json::from_str(&text).map_err(|e| {
            log::warn!(
                "Undecodable questions response: {}",
                prefix_chars(&text, BODY_EXCERPT_CHARS)
            );
            FetchError::Decode(e.to_string())
        })?;

        if questions.is_empty() {
            return Err(FetchError::Empty);
        }

        log::info!("Fetched {} questions", questions.len());
        Ok(questions)
    }

    /// Submit all answers in one request.
    pub async fn submit(&self, payload: &SubmissionPayload) -> Result<ScoreReport, SubmitError> {
        let url = self.config.submit_url();
        log::info!("Submitting {} answers to: {}", payload.answers.len(), url);

        let response = self
            .http
            .post(&url)
            .timeout(self.config.submit_timeout)
            .json(payload)
            .send()
            .await
            .map_err(map_submit_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(map_submit_transport)?;

        if !status.is_success() {
            return Err(SubmitError::Http {
                status: status.as_u16(),
                detail: error_detail(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| SubmitError::Unexpected(e.to_string()))
    }
}

fn map_submit_transport(error: reqwest::Error) -> SubmitError {
    if error.is_timeout() {
        SubmitError::Timeout
    } else {
        SubmitError::Network(error.to_string())
    }
}

/// Explain a failed submission from its response body.
fn error_detail(body: &str) -> ErrorDetail {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => match json.get("detail") {
            Some(Value::String(detail)) => ErrorDetail::Detail(detail.clone()),
            Some(detail) => ErrorDetail::Detail(detail.to_string()),
            None => ErrorDetail::Detail(body.to_string()),
        },
        Err(_) => ErrorDetail::Response(prefix_chars(body, BODY_EXCERPT_CHARS)),
    }
}
