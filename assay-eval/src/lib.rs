//! # Assay Eval
//!
//! Runs an agent over the question set of a remote scoring service and
//! submits the answers for scoring.
//!
//! ## Overview
//!
//! - **Scoring client**: fetches questions and submits answers
//! - **Attachments**: downloads the file attached to a question
//! - **Orchestrator**: the sequential fetch → answer → persist → submit run
//! - **Config**: [`EvalConfig`] plus the optional `assay.toml` file
//!
//! ## Architecture
//!
//! ```text
//! assay-core (agents, tools, LLM client)
//!     ↓
//! assay-runner (stream → answer)
//!     ↓
//! assay-eval (scoring client, orchestrator)  ← this crate
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use assay_core::{AgentContext, LlmClient, LlmConfig};
//! use assay_eval::{EvalConfig, Orchestrator, PreparedAgent};
//! use assay_tool_agent::{tools, ToolAgent, ToolAgentConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(EvalConfig::default(), || {
//!     let llm = Arc::new(LlmClient::new("api-key", LlmConfig::default())?);
//!     let registry = Arc::new(tools::full_registry(Arc::clone(&llm)));
//!     let agent = ToolAgent::new(ToolAgentConfig::default(), registry)?;
//!     Ok(PreparedAgent::new(Box::new(agent), AgentContext::from_arc(llm)))
//! })?;
//!
//! let report = orchestrator.run_evaluation(Some("alice")).await;
//! println!("{}", report.status_message());
//! # Ok(())
//! # }
//! ```

pub mod attachment;
pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod persist;
pub mod types;

// Re-export public API
pub use attachment::{AttachmentFetcher, AttachmentKind, AttachmentOutcome};
pub use client::ScoringClient;
pub use config::{EvalConfig, FileConfig, CONFIG_FILE_NAME, DEFAULT_API_URL};
pub use error::{AttachmentError, ConfigError, ErrorDetail, FetchError, SubmitError};
pub use orchestrator::{
    AgentFactory, EvalProgress, Orchestrator, PreparedAgent, RunReport, RunStatus,
};
pub use persist::save_answers;
pub use types::{AnswerRecord, QuestionItem, ResultLogEntry, ScoreReport, SubmissionPayload};
