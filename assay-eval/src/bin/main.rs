//! Evaluation CLI: answer the scoring service's questions and submit them.
//!
//! One invocation is one run. The status line and the results table are
//! printed when the run ends.

use anyhow::Context;
use assay_core::tool::ToolSet;
use assay_core::{truncate, AgentContext, AgentError, LlmClient, LlmConfig, MEDIA_MODEL};
use assay_eval::{
    EvalConfig, EvalProgress, FileConfig, Orchestrator, PreparedAgent, ResultLogEntry, RunReport,
};
use assay_tool_agent::{tools, ToolAgent, ToolAgentConfig};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Column widths of the results table.
const TASK_ID_WIDTH: usize = 36;
const QUESTION_WIDTH: usize = 60;
const ANSWER_WIDTH: usize = 40;

/// Evaluation CLI for assay agents.
#[derive(Parser, Debug)]
#[command(name = "assay-eval")]
#[command(about = "Fetch evaluation questions, answer them with the tool agent and submit")]
#[command(version)]
struct Args {
    /// Username the answers are submitted for
    #[arg(long, short = 'u', env = "ASSAY_USERNAME")]
    username: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the scoring service
    #[arg(long, env = "ASSAY_API_URL")]
    api_url: Option<String>,

    /// Space hosting the agent code (used for the agent code link)
    #[arg(long, env = "SPACE_ID")]
    space_id: Option<String>,

    /// Config file (default: ./assay.toml if present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Seconds to wait after each question [default: 100]
    #[arg(long)]
    item_delay_secs: Option<u64>,

    /// Directory for the answers JSON file [default: .]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Directory for downloaded attachments [default: working directory]
    #[arg(long)]
    attachment_dir: Option<PathBuf>,

    /// Model for the agent
    #[arg(long)]
    model: Option<String>,

    /// Model for image description and audio transcription
    #[arg(long)]
    media_model: Option<String>,

    /// LLM request timeout in seconds [default: 60]
    #[arg(long)]
    llm_timeout: Option<u64>,

    /// Maximum tokens per LLM request [default: 8192]
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Temperature for LLM generation (0.0-1.0) [default: 0.2]
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum function-calling steps per question [default: 10]
    #[arg(long)]
    max_steps: Option<usize>,

    /// Skip the final-answer check
    #[arg(long)]
    no_final_check: bool,

    /// Output format: table or json
    #[arg(long, short = 'o', default_value = "table")]
    output: String,

    /// Write the output to a file instead of stdout
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Settings resolved from flags, the config file and defaults, in that order.
#[derive(Debug, Clone)]
struct Settings {
    eval: EvalConfig,
    llm: LlmConfig,
    media_model: String,
    agent: ToolAgentConfig,
}

impl Args {
    /// Validate CLI arguments.
    fn validate(&self) -> Result<(), String> {
        if !["table", "json"].contains(&self.output.as_str()) {
            return Err(format!(
                "Invalid output format '{}'. Use 'table' or 'json'.",
                self.output
            ));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err(format!(
                    "temperature ({}) must be between 0.0 and 1.0",
                    temperature
                ));
            }
        }

        if self.max_steps == Some(0) {
            return Err("max-steps must be greater than 0".to_string());
        }

        if self.api_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            return Err("api-url must not be empty".to_string());
        }

        Ok(())
    }

    /// Merge flags over the config file over defaults.
    fn settings(&self, file: &FileConfig) -> Result<Settings, String> {
        let mut eval = file.apply_eval(EvalConfig::default());
        if let Some(url) = &self.api_url {
            eval.api_url = url.clone();
        }
        if self.space_id.is_some() {
            eval.space_id = self.space_id.clone();
        }
        if let Some(secs) = self.item_delay_secs {
            eval.item_delay = Duration::from_secs(secs);
        }
        if let Some(dir) = &self.output_dir {
            eval.output_dir = dir.clone();
        }
        if self.attachment_dir.is_some() {
            eval.attachment_dir = self.attachment_dir.clone();
        }

        let llm_file = &file.llm;
        let mut llm = LlmConfig::default();
        if let Some(model) = self.model.as_ref().or(llm_file.model.as_ref()) {
            llm = llm.with_model(model.clone());
        }
        if let Some(secs) = self.llm_timeout.or(llm_file.timeout_secs) {
            llm = llm.with_timeout(Duration::from_secs(secs));
        }
        if let Some(max_tokens) = self.max_tokens.or(llm_file.max_tokens) {
            llm = llm.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature.or(llm_file.temperature) {
            if !(0.0..=1.0).contains(&temperature) {
                return Err(format!(
                    "temperature ({}) must be between 0.0 and 1.0",
                    temperature
                ));
            }
            llm = llm.with_temperature(temperature);
        }
        if let Some(retries) = llm_file.max_retries {
            llm = llm.with_max_retries(retries);
        }
        let media_model = self
            .media_model
            .clone()
            .or_else(|| llm_file.media_model.clone())
            .unwrap_or_else(|| MEDIA_MODEL.to_string());

        let agent_file = &file.tool_agent;
        let mut agent = ToolAgentConfig::default();
        if let Some(max_steps) = self.max_steps.or(agent_file.max_steps) {
            agent = agent.with_max_steps(max_steps);
        }
        if let Some(prompt) = &agent_file.system_prompt {
            agent = agent.with_system_prompt(prompt.clone());
        }
        if let Some(tools) = &agent_file.tools {
            agent = agent.with_tool_set(ToolSet::Specific(tools.clone()));
        }
        let final_check = !self.no_final_check && agent_file.final_answer_check.unwrap_or(true);
        agent = agent.with_final_answer_check(final_check);
        agent.validate().map_err(|e| e.to_string())?;

        Ok(Settings {
            eval,
            llm,
            media_model,
            agent,
        })
    }
}

/// Build the orchestrator with a tool agent factory.
///
/// A missing API key surfaces as an agent initialization failure of the run.
fn build_orchestrator(settings: &Settings, api_key: Option<String>) -> anyhow::Result<Orchestrator> {
    let llm_config = settings.llm.clone();
    let agent_config = settings.agent.clone();
    let media_model = settings.media_model.clone();

    let factory = move || -> Result<PreparedAgent, AgentError> {
        let api_key = api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AgentError::Setup("GEMINI_API_KEY is not set".to_string()))?;
        let llm = Arc::new(LlmClient::new(api_key, llm_config.clone())?);
        let registry = Arc::new(tools::full_registry_with_media_model(
            Arc::clone(&llm),
            &media_model,
        ));
        let agent = ToolAgent::new(agent_config.clone(), registry)?;
        Ok(PreparedAgent::new(Box::new(agent), AgentContext::from_arc(llm)))
    };

    Orchestrator::new(settings.eval.clone(), factory).context("Invalid evaluation settings")
}

/// Run with a progress bar.
async fn run_with_progress(orchestrator: &Orchestrator, username: Option<&str>) -> RunReport {
    let progress_bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed}) {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style);

    let report = orchestrator
        .run_evaluation_with_progress(username, |progress| match progress {
            EvalProgress::Started { total } => {
                progress_bar.set_length(total as u64);
                progress_bar.set_message("Answering...");
            }
            EvalProgress::QuestionStarted { task_id, .. } => {
                progress_bar.set_message(format!("Task {}", task_id));
            }
            EvalProgress::QuestionCompleted {
                completed, success, ..
            } => {
                progress_bar.set_position(completed as u64);
                if !success {
                    progress_bar.println(format!("Question {} failed", completed));
                }
            }
            EvalProgress::Waiting { seconds } => {
                progress_bar.set_message(format!("Waiting {}s", seconds));
            }
            EvalProgress::Submitting { answers } => {
                progress_bar.set_message(format!("Submitting {} answers...", answers));
            }
            _ => {} // Handle future variants gracefully
        })
        .await;

    progress_bar.finish_and_clear();
    report
}

fn format_table(results: &[ResultLogEntry]) -> String {
    let mut out = format!(
        "{:<tw$}  {:<qw$}  {}\n{}\n",
        "Task ID",
        "Question",
        "Submitted Answer",
        "-".repeat(TASK_ID_WIDTH + QUESTION_WIDTH + ANSWER_WIDTH + 4),
        tw = TASK_ID_WIDTH,
        qw = QUESTION_WIDTH,
    );
    for entry in results {
        let question = entry.question.replace('\n', " ");
        let answer = entry.submitted_answer.replace('\n', " ");
        out.push_str(&format!(
            "{:<tw$}  {:<qw$}  {}\n",
            truncate(&entry.task_id, TASK_ID_WIDTH),
            truncate(&question, QUESTION_WIDTH),
            truncate(&answer, ANSWER_WIDTH),
            tw = TASK_ID_WIDTH,
            qw = QUESTION_WIDTH,
        ));
    }
    out
}

fn render(report: &RunReport, format: &str) -> anyhow::Result<String> {
    match format {
        "json" => {
            let value = json!({
                "status": report.status_message(),
                "success": report.is_success(),
                "answers_file": report.answers_file,
                "results": report.results,
            });
            serde_json::to_string_pretty(&value).context("Failed to serialize results")
        }
        _ => {
            let mut out = format!("{}\n", report.status_message());
            if let Some(results) = &report.results {
                out.push('\n');
                out.push_str(&format_table(results));
            }
            if let Some(path) = &report.answers_file {
                out.push_str(&format!("\nAnswers saved to: {}\n", path.display()));
            }
            Ok(out)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let (file_config, config_path) = FileConfig::discover(args.config.as_deref(), &cwd)?;
    let settings = args.settings(&file_config).map_err(anyhow::Error::msg)?;
    let orchestrator = build_orchestrator(&settings, args.api_key.clone())?;

    eprintln!("=== Assay Evaluation ===");
    eprintln!("Scoring service: {}", settings.eval.api_url);
    eprintln!("Agent code: {}", settings.eval.agent_code_url());
    eprintln!("Model: {}", settings.llm.model);
    eprintln!("Item delay: {}s", settings.eval.item_delay.as_secs());
    if let Some(path) = &config_path {
        eprintln!("Config: {}", path.display());
    }
    eprintln!();

    let report = run_with_progress(&orchestrator, args.username.as_deref()).await;
    let output = render(&report, &args.output)?;

    match &args.output_file {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
            eprintln!("{}", report.status_message());
            eprintln!("Results written to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(report.is_success())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Best effort: a missing .env is fine.
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let default_filter = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
