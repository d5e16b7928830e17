//! # Assay Runner
//!
//! Headless execution runtime for assay agents.
//!
//! Drains an agent's update stream into [`ExecutionMetrics`] so callers
//! (the evaluation orchestrator, tests) never deal with streams directly.
//!
//! ```text
//! assay-core (agents, events)
//!     ↓
//! assay-runner (metrics, runner)  ← this crate
//!     ↓
//! assay-eval (orchestrator, CLI)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use assay_core::{Agent, AgentContext};
//! use assay_runner::AgentRunner;
//!
//! async fn example(agent: &dyn Agent, context: AgentContext) -> Result<(), Box<dyn std::error::Error>> {
//!     let metrics = AgentRunner::new().execute(agent, "What is Rust?", context).await?;
//!     println!("Duration: {:?}", metrics.total_duration);
//!     println!("Answer: {:?}", metrics.final_answer);
//!     Ok(())
//! }
//! ```

pub mod metrics;
pub mod runner;
pub mod utils;

pub use metrics::ExecutionMetrics;
pub use runner::AgentRunner;
pub use utils::format_duration;
