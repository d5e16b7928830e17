//! Tool abstraction for agent actions.
//!
//! This module provides the core [`Tool`] trait and [`ToolRegistry`] for
//! managing tools that agents can invoke through native function calling.
//!
//! # Example
//!
//! ```no_run
//! use assay_core::tool::{Tool, ToolResult, ToolError, ToolRegistry};
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//!
//! #[derive(Debug)]
//! struct Shout;
//!
//! #[async_trait]
//! impl Tool for Shout {
//!     fn name(&self) -> &str { "shout" }
//!     fn description(&self) -> &str { "Uppercases the input" }
//!     fn parameters_schema(&self) -> Value {
//!         json!({
//!             "type": "object",
//!             "properties": { "text": { "type": "string" } },
//!             "required": ["text"]
//!         })
//!     }
//!     async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
//!         let text = input["text"].as_str().unwrap_or("");
//!         Ok(ToolResult::new(text.to_uppercase()))
//!     }
//! }
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(Shout);
//! assert!(registry.contains("shout"));
//! ```

mod registry;

pub use registry::ToolRegistry;

use crate::llm::FunctionDeclaration;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Result returned by a tool execution.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ToolResult {
    /// Text handed back to the model.
    pub content: String,
    /// Optional structured metadata for logging.
    pub metadata: Value,
}

impl ToolResult {
    /// Create a result with just content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Value::Null,
        }
    }

    /// Create a result with content and metadata.
    pub fn with_metadata(content: impl Into<String>, metadata: Value) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// Errors that can occur during tool execution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Invalid input provided to the tool.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tool execution failed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Tool not found in registry.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Tool execution timed out.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}

/// A tool that agents can invoke to perform actions.
///
/// Each tool has a unique name, a description and a JSON Schema for its
/// parameters; the model uses all three to decide when and how to call it.
/// Failures are returned as [`ToolError`] and are reported back to the model
/// rather than aborting the agent.
#[async_trait]
pub trait Tool: Send + Sync + fmt::Debug {
    /// Unique identifier for this tool (e.g. "calculator", "web_fetch").
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's input parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with arguments matching [`parameters_schema`](Tool::parameters_schema).
    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError>;

    /// Build the function declaration sent to the model.
    ///
    /// Only `properties` and `required` of the schema are forwarded; the
    /// declaration is always of type `object`.
    fn to_function_declaration(&self) -> FunctionDeclaration {
        let schema = self.parameters_schema();

        let properties = schema
            .get("properties")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let required: Vec<String> = schema
            .get("required")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let mut parameters = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            parameters["required"] = json!(required);
        }

        FunctionDeclaration::new(self.name(), self.description(), parameters)
    }
}

/// Per-agent filter selecting which tools an agent may call.
///
/// ```
/// use assay_core::tool::ToolSet;
///
/// let specific = ToolSet::Specific(vec!["calculator".into(), "web_fetch".into()]);
/// assert!(specific.matches("calculator"));
/// assert!(!ToolSet::None.matches("calculator"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolSet {
    /// Use all tools from registry.
    #[default]
    All,

    /// Use no tools.
    None,

    /// Use only the specified tools by name.
    Specific(Vec<String>),

    /// Use all tools except the specified ones.
    Except(Vec<String>),
}

impl ToolSet {
    /// Check if a tool name matches this filter.
    pub fn matches(&self, tool_name: &str) -> bool {
        match self {
            ToolSet::All => true,
            ToolSet::None => false,
            ToolSet::Specific(names) => names.iter().any(|n| n == tool_name),
            ToolSet::Except(names) => !names.iter().any(|n| n == tool_name),
        }
    }
}
