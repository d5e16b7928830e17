//! # Assay Core
//!
//! Core abstractions shared by the assay crates: the streaming [`Agent`]
//! trait, the [`Tool`](tool::Tool) trait and registry, and a Gemini
//! `generateContent` client.
//!
//! ## Architecture
//!
//! - **Streaming-first**: agents return async streams of [`AgentUpdate`]
//! - **Soft-typed events**: updates carry a free-form event type and JSON payload
//! - **Explicit configuration**: [`LlmConfig`] is built once and passed in
//!
//! ## Example
//!
//! ```no_run
//! use assay_core::{LlmClient, LlmConfig, LlmRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = LlmClient::new("api-key", LlmConfig::default())?;
//! let response = llm.generate(LlmRequest::new("What is 2 + 2?")).await?;
//! println!("{}", response.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod tool;
pub mod update;
pub mod utils;

pub use agent::{Agent, AgentContext, AgentStream};
pub use config::{LlmConfig, DEFAULT_LLM_BASE_URL, MEDIA_MODEL, MODEL};
pub use error::{AgentError, AssayError, LlmError};
pub use llm::{
    Content, FunctionCall, FunctionDeclaration, LlmClient, LlmRequest, LlmResponse, Part,
    UsageMetadata,
};
pub use tool::{Tool, ToolError, ToolRegistry, ToolResult, ToolSet};
pub use update::{AgentUpdate, FinalResult, ResultMetadata, EVENT_FINAL_RESULT};
pub use utils::{extract_final_answer, prefix_chars, truncate, FINAL_ANSWER_MARKER};
