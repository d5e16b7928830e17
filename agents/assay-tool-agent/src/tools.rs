//! Tool registry construction for the [`ToolAgent`](crate::ToolAgent).
//!
//! - [`Calculator`]: arithmetic
//! - [`FileRead`]: text files such as Python sources
//! - [`SpreadsheetRead`]: Excel and OpenDocument workbooks
//! - [`WebFetch`]: visit a webpage
//! - [`WebSearch`]: Google Search grounding (needs an [`LlmClient`])
//! - [`DescribeImage`], [`TranscribeAudio`]: multimodal model (needs an [`LlmClient`])

pub use assay_calculator::Calculator;
pub use assay_file_read::{FileRead, SpreadsheetRead};
pub use assay_media::{DescribeImage, TranscribeAudio};
pub use assay_web_fetch::WebFetch;
pub use assay_web_search::WebSearch;

use assay_core::tool::ToolRegistry;
use assay_core::{LlmClient, MEDIA_MODEL};
use std::sync::Arc;

/// Registry with the tools that need no model access.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(Calculator)
        .register(FileRead)
        .register(SpreadsheetRead)
        .register(WebFetch::new());
    registry
}

/// Registry with every tool, the model-backed ones sharing `llm`.
///
/// ```no_run
/// use assay_tool_agent::tools::full_registry;
/// use assay_core::{LlmClient, LlmConfig};
/// use std::sync::Arc;
///
/// let llm = Arc::new(LlmClient::new("key", LlmConfig::default()).unwrap());
/// let registry = full_registry(llm);
/// assert_eq!(registry.len(), 7);
/// ```
pub fn full_registry(llm: Arc<LlmClient>) -> ToolRegistry {
    full_registry_with_media_model(llm, MEDIA_MODEL)
}

/// Like [`full_registry`], with the image and audio tools on `media_model`.
pub fn full_registry_with_media_model(llm: Arc<LlmClient>, media_model: &str) -> ToolRegistry {
    let mut registry = default_registry();
    registry
        .register(WebSearch::new(Arc::clone(&llm)))
        .register(DescribeImage::new(Arc::clone(&llm)).with_model(media_model))
        .register(TranscribeAudio::new(llm).with_model(media_model));
    registry
}
