//! LLM client for the Gemini API.
//!
//! Provides:
//! - [`LlmClient`] for buffered `generateContent` calls with automatic retry
//! - [`LlmRequest`] builder covering system instructions, multi-turn
//!   conversations, inline media, function declarations and search grounding
//! - [`LlmResponse`] accessors for text, function calls and token usage
//!
//! # Example
//!
//! ```no_run
//! use assay_core::{LlmClient, LlmConfig, LlmRequest};
//!
//! # async fn example() -> Result<(), assay_core::LlmError> {
//! let client = LlmClient::new("api-key", LlmConfig::default())?;
//! let response = client.generate(LlmRequest::new("Explain Rust ownership")).await?;
//! println!("{}", response.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

mod client;
mod request;

pub use client::LlmClient;
pub use request::{
    Candidate, Content, FunctionCall, FunctionDeclaration, FunctionResponse, InlineData,
    LlmRequest, LlmResponse, Part, UsageMetadata, ROLE_MODEL, ROLE_USER,
};
