//! Streaming event types for agent updates.
//!
//! Events are soft-typed: `event_type` is a free-form string and `data` is
//! arbitrary JSON. Consumers must ignore event types they do not know. The
//! only event with a fixed contract is [`EVENT_FINAL_RESULT`], which every
//! agent emits last.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::SystemTime;

/// Event type of the final answer. Must be the last event of a stream.
pub const EVENT_FINAL_RESULT: &str = "final_result";

/// A single update emitted by an agent during execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentUpdate {
    /// Event type identifier (e.g. "tool_call", "final_result")
    pub event_type: String,

    /// Human-readable message
    pub message: String,

    /// When the event was produced
    pub timestamp: SystemTime,

    /// Event-specific payload
    pub data: Value,
}

/// Metadata attached to the final result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Tokens used across all LLM calls
    pub total_tokens: u32,

    /// Number of LLM calls that did not report token usage
    pub tokens_unavailable_count: usize,

    /// Wall-clock duration of the execution
    pub duration_ms: u64,
}

impl ResultMetadata {
    pub fn new(total_tokens: u32, tokens_unavailable_count: usize, duration_ms: u64) -> Self {
        Self {
            total_tokens,
            tokens_unavailable_count,
            duration_ms,
        }
    }
}

/// Typed view of a `final_result` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub answer: String,
    pub metadata: ResultMetadata,
}

impl AgentUpdate {
    /// Create an update with an arbitrary event type.
    pub fn custom(event_type: impl Into<String>, message: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            message: message.into(),
            timestamp: SystemTime::now(),
            data,
        }
    }

    /// Create the final result event.
    pub fn final_result(answer: String, metadata: ResultMetadata) -> Self {
        Self::custom(
            EVENT_FINAL_RESULT,
            "Answer generated",
            json!({
                "answer": answer,
                "metadata": metadata,
            }),
        )
    }

    /// Parse this update as a final result.
    ///
    /// Returns `None` for other event types or malformed payloads.
    pub fn as_final_result(&self) -> Option<FinalResult> {
        if self.event_type != EVENT_FINAL_RESULT {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }
}
