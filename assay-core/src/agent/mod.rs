//! Agent infrastructure.
//!
//! This module provides the core [`Agent`] trait for building AI agents,
//! along with the [`AgentContext`] for shared resources across agent executions.
//!
//! - **Streaming-first**: agents return async streams of [`AgentUpdate`]
//! - **Agent-specific config**: each agent owns its configuration (passed to constructor)
//! - **Minimal shared context**: [`AgentContext`] contains only the LLM client

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::update::AgentUpdate;

use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for the boxed, pinned stream returned by agents.
pub type AgentStream<'a> = Pin<Box<dyn Stream<Item = Result<AgentUpdate, AgentError>> + Send + 'a>>;

/// Trait for AI agents that process queries and return streaming updates.
///
/// # Example
///
/// ```no_run
/// use assay_core::{Agent, AgentContext, AgentStream, AgentUpdate, ResultMetadata};
///
/// struct EchoAgent;
///
/// impl Agent for EchoAgent {
///     fn name(&self) -> &str { "echo" }
///     fn description(&self) -> &str { "Repeats the question" }
///     fn execute(&self, query: &str, _context: AgentContext) -> AgentStream<'_> {
///         let answer = query.to_string();
///         Box::pin(futures_util::stream::once(async move {
///             Ok(AgentUpdate::final_result(answer, ResultMetadata::default()))
///         }))
///     }
/// }
/// ```
pub trait Agent: Send + Sync {
    /// Unique identifier for this agent type.
    fn name(&self) -> &str;

    /// Human-readable description of what this agent does.
    fn description(&self) -> &str;

    /// Execute the agent's logic and return a stream of updates.
    ///
    /// The stream must end with a `final_result` event on success.
    /// Consumers should handle unknown event types gracefully (log and ignore).
    fn execute(&self, query: &str, context: AgentContext) -> AgentStream<'_>;
}

/// Shared resources available to all agents during execution.
#[derive(Debug, Clone)]
pub struct AgentContext {
    /// Shared LLM client for making API calls.
    pub llm: Arc<LlmClient>,
}

impl AgentContext {
    /// Create a new context with an owned LLM client.
    pub fn new(llm: LlmClient) -> Self {
        Self { llm: Arc::new(llm) }
    }

    /// Create a context from an existing shared LLM client.
    pub fn from_arc(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }
}
