//! Headless agent execution runner.

use crate::metrics::ExecutionMetrics;
use assay_core::{Agent, AgentContext, AgentError, AgentUpdate};
use futures_util::StreamExt;
use std::time::Instant;

/// Headless agent runner for programmatic execution.
///
/// # Example
///
/// ```no_run
/// use assay_core::{Agent, AgentContext};
/// use assay_runner::AgentRunner;
///
/// # async fn example(agent: &dyn Agent, context: AgentContext) -> Result<(), Box<dyn std::error::Error>> {
/// let answer = AgentRunner::new().answer(agent, "What is Rust?", context).await?;
/// println!("{}", answer);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentRunner;

impl AgentRunner {
    /// Create a new headless runner.
    pub fn new() -> Self {
        Self
    }

    /// Execute an agent and return final metrics.
    ///
    /// # Errors
    ///
    /// Returns the first `AgentError` the stream yields.
    pub async fn execute(
        &self,
        agent: &dyn Agent,
        query: &str,
        context: AgentContext,
    ) -> Result<ExecutionMetrics, AgentError> {
        self.execute_with_callback(agent, query, context, |_| {})
            .await
    }

    /// Execute an agent, calling `on_update` for each event.
    pub async fn execute_with_callback<F>(
        &self,
        agent: &dyn Agent,
        query: &str,
        context: AgentContext,
        mut on_update: F,
    ) -> Result<ExecutionMetrics, AgentError>
    where
        F: FnMut(&AgentUpdate),
    {
        let start = Instant::now();
        let mut metrics = ExecutionMetrics::default();
        let stream = agent.execute(query, context);
        futures_util::pin_mut!(stream);

        while let Some(result) = stream.next().await {
            let update = result?;
            log::debug!("[{}] {}: {}", agent.name(), update.event_type, update.message);
            metrics.record(&update);
            on_update(&update);
        }

        metrics.total_duration = start.elapsed();
        Ok(metrics)
    }

    /// Execute an agent and return only its final answer.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NoAnswer`] if the stream ends without a
    /// `final_result` event.
    pub async fn answer(
        &self,
        agent: &dyn Agent,
        query: &str,
        context: AgentContext,
    ) -> Result<String, AgentError> {
        let metrics = self.execute(agent, query, context).await?;
        log::info!(
            "Agent '{}' finished in {} ({} events, {} tokens)",
            agent.name(),
            crate::format_duration(metrics.total_duration),
            metrics.events,
            metrics.total_tokens
        );
        metrics.final_answer.ok_or(AgentError::NoAnswer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_core::{AgentStream, LlmClient, LlmConfig, ResultMetadata};
    use async_stream::stream;
    use serde_json::json;

    struct MockAgent {
        events: Vec<Result<AgentUpdate, String>>,
    }

    impl MockAgent {
        fn new(events: Vec<Result<AgentUpdate, String>>) -> Self {
            Self { events }
        }
    }

    impl Agent for MockAgent {
        fn name(&self) -> &str {
            "mock_agent"
        }

        fn description(&self) -> &str {
            "Mock agent for testing"
        }

        fn execute(&self, _query: &str, _context: AgentContext) -> AgentStream<'_> {
            let events = self.events.clone();
            Box::pin(stream! {
                for event in events {
                    yield event.map_err(AgentError::Other);
                }
            })
        }
    }

    fn create_mock_context() -> AgentContext {
        AgentContext::new(LlmClient::new("test-key", LlmConfig::default()).unwrap())
    }

    fn successful_events() -> Vec<Result<AgentUpdate, String>> {
        vec![
            Ok(AgentUpdate::custom("tool_agent_started", "Starting", json!({}))),
            Ok(AgentUpdate::custom("tool_call", "calculator", json!({"tool": "calculator"}))),
            Ok(AgentUpdate::final_result(
                "Final answer".to_string(),
                ResultMetadata::new(100, 0, 1000),
            )),
        ]
    }

    #[tokio::test]
    async fn test_runner_execute_success() {
        let agent = MockAgent::new(successful_events());

        let metrics = AgentRunner::new()
            .execute(&agent, "test query", create_mock_context())
            .await
            .unwrap();

        assert_eq!(metrics.events, 3);
        assert_eq!(metrics.event_counts.get("tool_call"), Some(&1));
        assert_eq!(metrics.total_tokens, 100);
        assert_eq!(metrics.final_answer, Some("Final answer".to_string()));
    }

    #[tokio::test]
    async fn test_runner_with_callback() {
        let agent = MockAgent::new(successful_events());
        let mut seen = Vec::new();

        AgentRunner::new()
            .execute_with_callback(&agent, "query", create_mock_context(), |update| {
                seen.push(update.event_type.clone());
            })
            .await
            .unwrap();

        assert_eq!(seen, vec!["tool_agent_started", "tool_call", "final_result"]);
    }

    #[tokio::test]
    async fn test_answer_without_final_result() {
        let agent = MockAgent::new(vec![Ok(AgentUpdate::custom(
            "tool_agent_started",
            "Starting",
            json!({}),
        ))]);

        let err = AgentRunner::new()
            .answer(&agent, "query", create_mock_context())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::NoAnswer));
    }

    #[tokio::test]
    async fn test_stream_error_is_propagated() {
        let agent = MockAgent::new(vec![
            Ok(AgentUpdate::custom("tool_agent_started", "Starting", json!({}))),
            Err("boom".to_string()),
            Ok(AgentUpdate::final_result(
                "never".to_string(),
                ResultMetadata::default(),
            )),
        ]);

        let err = AgentRunner::new()
            .answer(&agent, "query", create_mock_context())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
