//! WebSearch tool for real-time web search.
//!
//! This tool wraps Gemini's Google Search grounding capability, allowing
//! agents to look up facts that are not in the model's training data.

use assay_core::tool::{Tool, ToolError, ToolResult};
use assay_core::{LlmClient, LlmRequest};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// System instruction for grounded web search queries.
const SEARCH_SYSTEM_INSTRUCTION: &str = "\
You are a search assistant. Answer the query using the search results. \
Include relevant facts, figures, dates and source URLs. \
If the results are insufficient or conflicting, say so clearly.";

/// WebSearch tool for real-time web search.
///
/// # Example
///
/// ```no_run
/// use assay_web_search::WebSearch;
/// use assay_core::{LlmClient, LlmConfig, tool::Tool};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let llm = Arc::new(LlmClient::new("api-key", LlmConfig::default())?);
/// let search = WebSearch::new(llm);
/// let result = search.execute(json!({"query": "Mercedes Sosa discography"})).await?;
/// println!("{}", result.content);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WebSearch {
    llm: Arc<LlmClient>,
}

impl std::fmt::Debug for WebSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearch")
            .field("llm", &"LlmClient")
            .finish()
    }
}

impl WebSearch {
    /// Create a new WebSearch tool with the given LLM client.
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for real-time information. Uses Google Search grounding \
         to find facts, figures, recent events and the URLs of relevant pages."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to look up on the web"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidInput("Missing 'query' field".into()))?;

        if query.trim().is_empty() {
            return Err(ToolError::InvalidInput("Query cannot be empty".into()));
        }

        log::debug!("web_search: {}", query);

        let request =
            LlmRequest::with_system(query, SEARCH_SYSTEM_INSTRUCTION).with_google_search();

        let response = self
            .llm
            .generate(request)
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Search failed: {}", e)))?;

        let text = response
            .text()
            .ok_or_else(|| ToolError::ExecutionFailed("Search returned no content".into()))?;

        Ok(ToolResult::with_metadata(
            text,
            json!({ "query": query, "tokens": response.total_tokens() }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_core::LlmConfig;
    use mockito::Matcher;

    fn create_test_llm(base_url: &str) -> Arc<LlmClient> {
        let config = LlmConfig::default()
            .with_base_url(base_url)
            .with_max_retries(0);
        Arc::new(LlmClient::new("test-key", config).unwrap())
    }

    #[test]
    fn test_web_search_name_and_schema() {
        let search = WebSearch::new(create_test_llm("http://localhost"));
        assert_eq!(search.name(), "web_search");
        let schema = search.parameters_schema();
        assert!(schema["properties"]["query"].is_object());
        assert!(format!("{:?}", search).contains("WebSearch"));
    }

    #[tokio::test]
    async fn test_web_search_empty_query() {
        let search = WebSearch::new(create_test_llm("http://localhost"));
        let err = search.execute(json!({"query": "  "})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(ref msg) if msg.contains("empty")));
    }

    #[tokio::test]
    async fn test_web_search_missing_query() {
        let search = WebSearch::new(create_test_llm("http://localhost"));
        let err = search.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_web_search_enables_grounding() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .match_body(Matcher::PartialJson(json!({"tools": [{"googleSearch": {}}]})))
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [{"content": {"role": "model", "parts": [{"text": "Released in 2009."}]}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let search = WebSearch::new(create_test_llm(&server.url()));
        let result = search
            .execute(json!({"query": "Cantora release year"}))
            .await
            .unwrap();

        assert_eq!(result.content, "Released in 2009.");
        assert_eq!(result.metadata["query"], "Cantora release year");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_web_search_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .with_status(400)
            .with_body("bad request")
            .create_async()
            .await;

        let search = WebSearch::new(create_test_llm(&server.url()));
        let err = search.execute(json!({"query": "q"})).await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(ref msg) if msg.starts_with("Search failed")));
    }
}
