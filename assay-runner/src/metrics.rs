//! Execution metrics for programmatic consumption.

use assay_core::{AgentUpdate, FinalResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Immutable snapshot of one agent execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    /// Total wall-clock duration of execution
    pub total_duration: Duration,

    /// Total tokens used across all LLM calls, as reported by the agent
    pub total_tokens: u32,

    /// Number of calls where token count was unavailable
    pub tokens_unavailable_count: usize,

    /// Number of events received from the agent
    pub events: usize,

    /// Events received, keyed by event type
    pub event_counts: BTreeMap<String, usize>,

    /// The final answer, if the agent emitted a `final_result` event
    pub final_answer: Option<String>,
}

impl ExecutionMetrics {
    /// Fold one update into the metrics.
    pub(crate) fn record(&mut self, update: &AgentUpdate) {
        self.events += 1;
        *self
            .event_counts
            .entry(update.event_type.clone())
            .or_insert(0) += 1;

        if let Some(FinalResult { answer, metadata }) = update.as_final_result() {
            self.total_tokens = metadata.total_tokens;
            self.tokens_unavailable_count = metadata.tokens_unavailable_count;
            self.final_answer = Some(answer);
        }
    }
}
