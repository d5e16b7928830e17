//! Tool Agent: a bounded function-calling loop followed by a final-answer check.
//!
//! Each step sends the conversation and the declarations of the enabled tools
//! to the model. Function calls are executed through the [`ToolRegistry`] and
//! their results appended to the conversation; a plain text reply ends the
//! loop. The draft answer is then restated by the model with a strict
//! `FINAL ANSWER:` template, and the text after the marker becomes the
//! answer.
//!
//! # Example
//!
//! ```no_run
//! use assay_tool_agent::{tools, ToolAgent, ToolAgentConfig};
//! use assay_core::{Agent, AgentContext, LlmClient, LlmConfig};
//! use futures_util::StreamExt;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(LlmClient::new("api-key", LlmConfig::default())?);
//! let registry = Arc::new(tools::full_registry(Arc::clone(&llm)));
//! let agent = ToolAgent::new(ToolAgentConfig::default(), registry)?;
//!
//! let stream = agent.execute("What is 25 * 4?", AgentContext::from_arc(llm));
//! futures_util::pin_mut!(stream);
//! while let Some(update) = stream.next().await {
//!     let update = update?;
//!     println!("[{}] {}", update.event_type, update.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod tools;

use assay_core::tool::{ToolRegistry, ToolSet};
use assay_core::{
    extract_final_answer, truncate, Agent, AgentContext, AgentError, AgentStream, AgentUpdate,
    Content, FunctionCall, LlmRequest, LlmResponse, Part, ResultMetadata,
};
use async_stream::try_stream;
use futures_util::Stream;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

/// Emitted when the tool agent starts processing
pub const EVENT_TOOL_AGENT_STARTED: &str = "tool_agent_started";

/// Emitted after every tool execution
pub const EVENT_TOOL_CALL: &str = "tool_call";

/// Emitted when the step budget runs out before a text reply
pub const EVENT_TOOL_AGENT_MAX_STEPS: &str = "tool_agent_max_steps";

/// Emitted after the final-answer check
pub const EVENT_FINAL_ANSWER_CHECK: &str = "final_answer_check";

/// Longest tool output quoted in the step transcript.
const TRANSCRIPT_RESULT_CHARS: usize = 300;

const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a general AI assistant answering benchmark questions. \
Use the available tools to search the web, visit webpages, read attached files, \
describe images, transcribe audio and do arithmetic. \
When a question mentions a file path, pass that exact path to the matching tool. \
Think step by step and reply with a concise answer once you have one.";

const FINAL_ANSWER_TEMPLATE: &str = "\
Report your thoughts, and finish your answer with the following template:
FINAL ANSWER: [YOUR FINAL ANSWER].
YOUR FINAL ANSWER should be a number OR as few words as possible OR a comma separated list of numbers and/or strings.
If you are asked for a number, don't use comma to write your number neither use units such as $ or percent sign unless specified otherwise.
If you are asked for a string, don't use articles, neither abbreviations (e.g. for cities), and write the digits in plain text unless specified otherwise.
If you are asked for a comma separated list, apply the above rules depending of whether the element to be put in the list is a number or a string.";

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the ToolAgent.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ToolAgentConfig {
    /// Maximum number of model turns that may request tools
    ///
    /// Default: 10
    pub max_steps: usize,

    /// System prompt for the function-calling loop
    pub system_prompt: String,

    /// Which registry tools the model may call
    pub tool_set: ToolSet,

    /// Restate the draft answer with the `FINAL ANSWER:` template
    ///
    /// Default: true
    pub final_answer_check: bool,
}

impl Default for ToolAgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            tool_set: ToolSet::All,
            final_answer_check: true,
        }
    }
}

impl ToolAgentConfig {
    /// Validate the configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), AgentError> {
        let mut errors = Vec::new();

        if self.max_steps == 0 {
            errors.push("max_steps must be greater than zero");
        }
        if self.system_prompt.trim().is_empty() {
            errors.push("system_prompt must not be empty");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AgentError::InvalidConfig(errors.join("; ")))
        }
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_tool_set(mut self, tool_set: ToolSet) -> Self {
        self.tool_set = tool_set;
        self
    }

    #[must_use]
    pub fn with_final_answer_check(mut self, enabled: bool) -> Self {
        self.final_answer_check = enabled;
        self
    }
}

// ============================================================================
// Tool Agent
// ============================================================================

/// Running token totals across the model calls of one execution.
#[derive(Debug, Default)]
struct TokenTally {
    total: u32,
    unavailable: usize,
}

impl TokenTally {
    fn add(&mut self, response: &LlmResponse) {
        match response.total_tokens() {
            Some(tokens) => self.total = self.total.saturating_add(tokens),
            None => self.unavailable += 1,
        }
    }
}

/// An agent that answers questions through native function calling.
pub struct ToolAgent {
    config: ToolAgentConfig,
    registry: Arc<ToolRegistry>,
}

impl ToolAgent {
    /// Create a new ToolAgent.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: ToolAgentConfig, registry: Arc<ToolRegistry>) -> Result<Self, AgentError> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    /// Execute one tool call, turning every failure into a message for the model.
    async fn run_tool(&self, call: &FunctionCall) -> Result<String, String> {
        if !self.config.tool_set.matches(&call.name) {
            return Err(format!("Tool not available: {}", call.name));
        }
        let tool = self
            .registry
            .get(&call.name)
            .ok_or_else(|| format!("Tool not found: {}", call.name))?;
        tool.execute(call.args.clone())
            .await
            .map(|result| result.content)
            .map_err(|e| e.to_string())
    }

    /// Execute the tool agent.
    pub fn execute(
        &self,
        query: &str,
        context: AgentContext,
    ) -> impl Stream<Item = Result<AgentUpdate, AgentError>> + Send + '_ {
        let query = query.to_string();

        try_stream! {
            let start_time = Instant::now();
            let mut tokens = TokenTally::default();
            let declarations = self.registry.to_function_declarations(&self.config.tool_set);
            let tool_names: Vec<String> = declarations.iter().map(|d| d.name.clone()).collect();

            yield AgentUpdate::custom(
                EVENT_TOOL_AGENT_STARTED,
                format!("Processing query with {} tools available", tool_names.len()),
                json!({
                    "query": query,
                    "tools": tool_names,
                    "max_steps": self.config.max_steps,
                }),
            );

            let mut contents = vec![Content::user(query.clone())];
            let mut transcript: Vec<String> = Vec::new();
            let mut draft: Option<String> = None;

            for step in 1..=self.config.max_steps {
                let request = LlmRequest::from_contents(contents.clone())
                    .with_system_instruction(self.config.system_prompt.clone())
                    .with_functions(declarations.clone());

                let response = context.llm.generate(request).await?;
                tokens.add(&response);

                let calls: Vec<FunctionCall> =
                    response.function_calls().into_iter().cloned().collect();
                if calls.is_empty() {
                    draft = Some(response.text().unwrap_or_default());
                    break;
                }

                if let Some(model_turn) = response.content() {
                    let mut model_turn = model_turn.clone();
                    model_turn.role = Some(assay_core::llm::ROLE_MODEL.to_string());
                    contents.push(model_turn);
                }

                let mut parts = Vec::with_capacity(calls.len());
                for call in &calls {
                    let call_start = Instant::now();
                    let outcome = self.run_tool(call).await;
                    let duration_ms = call_start.elapsed().as_millis() as u64;

                    let (response_value, data, message) = match &outcome {
                        Ok(content) => (
                            json!({ "result": content }),
                            json!({
                                "step": step,
                                "tool": call.name,
                                "args": call.args,
                                "result": truncate(content, TRANSCRIPT_RESULT_CHARS),
                                "duration_ms": duration_ms,
                            }),
                            format!("Called {}", call.name),
                        ),
                        Err(error) => {
                            log::warn!("Tool '{}' failed: {}", call.name, error);
                            (
                                json!({ "error": error }),
                                json!({
                                    "step": step,
                                    "tool": call.name,
                                    "args": call.args,
                                    "error": error,
                                    "duration_ms": duration_ms,
                                }),
                                format!("Tool {} failed", call.name),
                            )
                        }
                    };

                    transcript.push(transcript_line(step, call, &outcome));
                    parts.push(Part::function_response(call.name.clone(), response_value));
                    yield AgentUpdate::custom(EVENT_TOOL_CALL, message, data);
                }
                contents.push(Content::user_parts(parts));
            }

            let draft = match draft {
                Some(draft) => draft,
                None => {
                    yield AgentUpdate::custom(
                        EVENT_TOOL_AGENT_MAX_STEPS,
                        format!("Reached max steps ({})", self.config.max_steps),
                        json!({ "max_steps": self.config.max_steps }),
                    );
                    // One more turn without tools forces a text reply.
                    let request = LlmRequest::from_contents(contents.clone())
                        .with_system_instruction(self.config.system_prompt.clone());
                    let response = context.llm.generate(request).await?;
                    tokens.add(&response);
                    response.text().unwrap_or_default()
                }
            };

            let answer = if self.config.final_answer_check {
                let prompt = final_check_prompt(&query, &transcript, &draft);
                let (checked, response_text) = match context.llm.generate(LlmRequest::new(prompt)).await {
                    Ok(response) => {
                        tokens.add(&response);
                        let text = response.text().unwrap_or_default();
                        (parse_answer(&text), text)
                    }
                    Err(e) => {
                        log::warn!("Final answer check failed, keeping draft answer: {}", e);
                        (parse_answer(&draft), String::new())
                    }
                };
                yield AgentUpdate::custom(
                    EVENT_FINAL_ANSWER_CHECK,
                    "Final answer checked",
                    json!({
                        "draft": draft,
                        "response": response_text,
                        "answer": checked,
                    }),
                );
                checked
            } else {
                parse_answer(&draft)
            };

            let metadata = ResultMetadata::new(
                tokens.total,
                tokens.unavailable,
                start_time.elapsed().as_millis() as u64,
            );
            yield AgentUpdate::final_result(answer, metadata);
        }
    }
}

impl Agent for ToolAgent {
    fn name(&self) -> &str {
        "tool_agent"
    }

    fn description(&self) -> &str {
        "Answers questions with native function calling and a final-answer check"
    }

    fn execute(&self, query: &str, context: AgentContext) -> AgentStream<'_> {
        Box::pin(ToolAgent::execute(self, query, context))
    }
}

fn transcript_line(step: usize, call: &FunctionCall, outcome: &Result<String, String>) -> String {
    let args = if call.args.is_null() {
        Value::Object(Default::default())
    } else {
        call.args.clone()
    };
    match outcome {
        Ok(content) => format!(
            "Step {}: {}({}) -> {}",
            step,
            call.name,
            args,
            truncate(content, TRANSCRIPT_RESULT_CHARS)
        ),
        Err(error) => format!("Step {}: {}({}) failed: {}", step, call.name, args, error),
    }
}

/// Prompt asking the model to restate an answer with the strict template.
fn final_check_prompt(query: &str, transcript: &[String], draft: &str) -> String {
    let steps = if transcript.is_empty() {
        "(no tool calls)".to_string()
    } else {
        transcript.join("\n")
    };
    format!(
        "Here is a user-given task and the agent steps.\n\
         Task: {}\n\
         Steps:\n{}\n\
         Draft answer: {}\n\n\
         {}",
        query, steps, draft, FINAL_ANSWER_TEMPLATE
    )
}

/// Take the text after the last `FINAL ANSWER:` marker, or the whole reply.
///
/// A single trailing period is dropped since the template itself ends in one.
fn parse_answer(text: &str) -> String {
    let answer = extract_final_answer(text).unwrap_or_else(|| text.trim().to_string());
    match answer.strip_suffix('.') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => answer,
    }
}

// ============================================================================
// Tests
// ============================================================================
