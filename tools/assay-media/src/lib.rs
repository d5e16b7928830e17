//! Multimodal tools: [`DescribeImage`] and [`TranscribeAudio`].
//!
//! Both read a local file, send it inline to a multimodal Gemini model
//! ([`MEDIA_MODEL`] by default) together with a fixed instruction, and
//! return the model's text.

use assay_core::tool::{Tool, ToolError, ToolResult};
use assay_core::{LlmClient, LlmRequest, MEDIA_MODEL};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

/// Largest file sent inline (Gemini caps inline request data at 20MB).
const MAX_MEDIA_SIZE: u64 = 20 * 1024 * 1024;

const IMAGE_PROMPT: &str = "Describe the image in detail.";
const AUDIO_PROMPT: &str = "Please transcribe the content of this audio.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
        }
    }
}

/// MIME type for a media file, judged by its extension.
fn mime_type(path: &Path, kind: MediaKind) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match (kind, extension.as_str()) {
        (MediaKind::Image, "png") => "image/png",
        (MediaKind::Image, "jpg" | "jpeg") => "image/jpeg",
        (MediaKind::Image, "gif") => "image/gif",
        (MediaKind::Image, "webp") => "image/webp",
        (MediaKind::Audio, "mp3") => "audio/mp3",
        (MediaKind::Audio, "wav") => "audio/wav",
        (MediaKind::Audio, "flac") => "audio/flac",
        (MediaKind::Audio, "ogg") => "audio/ogg",
        (MediaKind::Audio, "m4a" | "aac") => "audio/aac",
        _ => return None,
    };
    Some(mime)
}

/// Shared request path for both tools.
async fn ask_about_file(
    llm: &LlmClient,
    model: &str,
    kind: MediaKind,
    prompt: &str,
    input: &Value,
) -> Result<ToolResult, ToolError> {
    let path_str = input
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidInput("Missing 'path' field".into()))?;
    let path = Path::new(path_str);

    let mime = mime_type(path, kind).ok_or_else(|| {
        ToolError::InvalidInput(format!(
            "Unsupported {} file type: {}",
            kind.label(),
            path_str
        ))
    })?;

    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotFound(format!("File not found: {}", path_str))
        } else {
            ToolError::ExecutionFailed(format!("Failed to get file metadata: {}", e))
        }
    })?;
    if metadata.len() > MAX_MEDIA_SIZE {
        return Err(ToolError::InvalidInput(format!(
            "File too large ({} bytes, max {} bytes)",
            metadata.len(),
            MAX_MEDIA_SIZE
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ToolError::ExecutionFailed(format!("Failed to read file: {}", e)))?;

    log::debug!(
        "Sending {} ({}, {} bytes) to {}",
        path_str,
        mime,
        bytes.len(),
        model
    );

    let request = LlmRequest::new(prompt)
        .with_inline_data(mime, &bytes)
        .with_model(model);

    let response = llm.generate(request).await.map_err(|e| {
        ToolError::ExecutionFailed(format!("{} request failed: {}", kind.label(), e))
    })?;

    let text = response
        .text()
        .ok_or_else(|| ToolError::ExecutionFailed("Model returned no text".into()))?;

    Ok(ToolResult::with_metadata(
        text,
        json!({ "path": path_str, "mime_type": mime, "model": model }),
    ))
}

fn path_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "path": {
                "type": "string",
                "description": description
            }
        },
        "required": ["path"]
    })
}

/// Describes an image file using a multimodal model.
///
/// ```no_run
/// use assay_media::DescribeImage;
/// use assay_core::{LlmClient, LlmConfig, tool::Tool};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let llm = Arc::new(LlmClient::new("api-key", LlmConfig::default())?);
/// let result = DescribeImage::new(llm).execute(json!({"path": "board.png"})).await?;
/// println!("{}", result.content);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DescribeImage {
    llm: Arc<LlmClient>,
    model: String,
}

impl DescribeImage {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self {
            llm,
            model: MEDIA_MODEL.to_string(),
        }
    }

    /// Use a different multimodal model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl std::fmt::Debug for DescribeImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescribeImage")
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl Tool for DescribeImage {
    fn name(&self) -> &str {
        "describe_image"
    }

    fn description(&self) -> &str {
        "Return a detailed description of an image file (png, jpg, gif, webp)."
    }

    fn parameters_schema(&self) -> Value {
        path_schema("Path to the image to describe")
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        ask_about_file(&self.llm, &self.model, MediaKind::Image, IMAGE_PROMPT, &input).await
    }
}

/// Transcribes an audio file using a multimodal model.
#[derive(Clone)]
pub struct TranscribeAudio {
    llm: Arc<LlmClient>,
    model: String,
}

impl TranscribeAudio {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self {
            llm,
            model: MEDIA_MODEL.to_string(),
        }
    }

    /// Use a different multimodal model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl std::fmt::Debug for TranscribeAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscribeAudio")
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl Tool for TranscribeAudio {
    fn name(&self) -> &str {
        "transcribe_audio"
    }

    fn description(&self) -> &str {
        "Return a transcription of an audio file (mp3, wav, flac, ogg, m4a)."
    }

    fn parameters_schema(&self) -> Value {
        path_schema("Path to the audio file to transcribe")
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        ask_about_file(&self.llm, &self.model, MediaKind::Audio, AUDIO_PROMPT, &input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_core::LlmConfig;
    use mockito::Matcher;
    use rstest::rstest;
    use std::io::Write;

    fn create_test_llm(base_url: &str) -> Arc<LlmClient> {
        let config = LlmConfig::default()
            .with_base_url(base_url)
            .with_max_retries(0);
        Arc::new(LlmClient::new("test-key", config).unwrap())
    }

    fn text_body(text: &str) -> String {
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
            .to_string()
    }

    #[rstest]
    #[case::png("a.png", MediaKind::Image, Some("image/png"))]
    #[case::jpeg_upper("a.JPEG", MediaKind::Image, Some("image/jpeg"))]
    #[case::mp3("a.mp3", MediaKind::Audio, Some("audio/mp3"))]
    #[case::audio_as_image("a.mp3", MediaKind::Image, None)]
    #[case::no_extension("README", MediaKind::Audio, None)]
    fn test_mime_type(#[case] path: &str, #[case] kind: MediaKind, #[case] expected: Option<&str>) {
        assert_eq!(mime_type(Path::new(path), kind), expected);
    }

    #[tokio::test]
    async fn test_describe_image_sends_inline_data() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"abc").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash-lite:generateContent")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": IMAGE_PROMPT},
                        {"inlineData": {"mimeType": "image/png", "data": "YWJj"}}
                    ]
                }]
            })))
            .with_status(200)
            .with_body(text_body("A chess board."))
            .create_async()
            .await;

        let tool = DescribeImage::new(create_test_llm(&server.url()));
        let result = tool
            .execute(json!({"path": file.path().to_str().unwrap()}))
            .await
            .unwrap();

        assert_eq!(result.content, "A chess board.");
        assert_eq!(result.metadata["mime_type"], "image/png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transcribe_audio_uses_custom_model() {
        let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        file.write_all(b"\x00\x01").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"parts": [{"text": AUDIO_PROMPT}]}]
            })))
            .with_status(200)
            .with_body(text_body("Page 245, 197 and 132."))
            .create_async()
            .await;

        let tool = TranscribeAudio::new(create_test_llm(&server.url())).with_model("gemini-2.5-flash");
        let result = tool
            .execute(json!({"path": file.path().to_str().unwrap()}))
            .await
            .unwrap();

        assert_eq!(result.content, "Page 245, 197 and 132.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unsupported_extension_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let tool = DescribeImage::new(create_test_llm(&server.url()));
        let err = tool.execute(json!({"path": "notes.txt"})).await.unwrap_err();

        assert!(matches!(err, ToolError::InvalidInput(ref m) if m.contains("Unsupported image")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_file() {
        let tool = TranscribeAudio::new(create_test_llm("http://localhost"));
        let err = tool
            .execute(json!({"path": "/nonexistent/clip.mp3"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn test_names() {
        let llm = create_test_llm("http://localhost");
        assert_eq!(DescribeImage::new(llm.clone()).name(), "describe_image");
        assert_eq!(TranscribeAudio::new(llm).name(), "transcribe_audio");
    }
}
