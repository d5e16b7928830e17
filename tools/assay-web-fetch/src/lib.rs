//! WebFetch tool for visiting webpages.
//!
//! HTML responses are rendered as plain text with `html2text`, keeping table
//! layout and link targets; runs of three or more newlines collapse to two.

mod html;

use assay_core::tool::{Tool, ToolError, ToolResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub use html::html_to_text;

/// Default timeout for HTTP requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum response body size (5MB).
const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024;

/// WebFetch tool for fetching URL content.
///
/// # Example
///
/// ```no_run
/// use assay_web_fetch::WebFetch;
/// use assay_core::tool::Tool;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tool = WebFetch::new();
/// let result = tool.execute(json!({"url": "https://example.com"})).await?;
/// println!("Content: {}", result.content);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WebFetch {
    client: Client,
    timeout: Duration,
}

impl Default for WebFetch {
    fn default() -> Self {
        Self::new()
    }
}

impl WebFetch {
    /// Create a new WebFetch tool with default settings.
    pub fn new() -> Self {
        Self::with_client(Client::new(), Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a WebFetch tool with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_client(Client::new(), timeout)
    }

    /// Create a WebFetch tool sharing an existing reqwest Client.
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

fn too_large(size: u64) -> ToolError {
    ToolError::InvalidInput(format!(
        "Response too large ({} bytes, max {} bytes)",
        size, MAX_RESPONSE_SIZE
    ))
}

#[async_trait]
impl Tool for WebFetch {
    fn name(&self) -> &str {
        "web_fetch"
    }

    fn description(&self) -> &str {
        "Visit a webpage and return its content as readable text. \
         Use it to read pages found through web_search. \
         Has a 30-second timeout and 5MB size limit."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL of the webpage to visit (must be http:// or https://)"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let url = input
            .get("url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidInput("Missing 'url' field".into()))?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::InvalidInput(format!(
                "URL must start with http:// or https://, got: {}",
                url
            )));
        }

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToolError::Timeout(self.timeout.as_millis() as u64)
                } else if e.is_connect() {
                    ToolError::ExecutionFailed(format!("Failed to connect: {}", e))
                } else {
                    ToolError::ExecutionFailed(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_RESPONSE_SIZE as u64 {
                return Err(too_large(content_length));
            }
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("html"));

        let bytes = response.bytes().await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to read response body: {}", e))
        })?;

        if bytes.len() > MAX_RESPONSE_SIZE {
            return Err(too_large(bytes.len() as u64));
        }

        let body = match String::from_utf8(bytes.to_vec()) {
            Ok(s) => s,
            Err(e) => {
                log::warn!(
                    "Response from {} contained invalid UTF-8 at byte {}, using lossy conversion",
                    url,
                    e.utf8_error().valid_up_to()
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let looks_like_html = is_html || body.trim_start().starts_with('<');
        let content = if looks_like_html {
            html_to_text(&body)?
        } else {
            html::collapse_blank_lines(body.trim())?
        };

        log::debug!("Fetched {} ({} chars)", url, content.chars().count());

        Ok(ToolResult::with_metadata(
            content,
            json!({ "url": url, "status": status.as_u16(), "html": looks_like_html }),
        ))
    }
}
