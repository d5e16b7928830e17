//! The evaluation run: fetch questions, answer each one, submit.
//!
//! Questions are processed strictly one after another. Setup and fetch
//! failures end the run without a results table; per-question failures are
//! recorded in the table and the run continues; submission failures become
//! the final status. Nothing is retried and nothing escapes
//! [`Orchestrator::run_evaluation`] as an error.

use crate::attachment::{AttachmentFetcher, AttachmentOutcome};
use crate::client::ScoringClient;
use crate::config::EvalConfig;
use crate::error::{ConfigError, FetchError, SubmitError};
use crate::persist::save_answers;
use crate::types::{AnswerRecord, QuestionItem, ResultLogEntry, ScoreReport, SubmissionPayload};
use assay_core::{Agent, AgentContext, AgentError};
use assay_runner::AgentRunner;
use std::fmt;
use std::path::PathBuf;

/// An agent ready to run, with the context it runs in.
pub struct PreparedAgent {
    pub agent: Box<dyn Agent>,
    pub context: AgentContext,
}

impl PreparedAgent {
    pub fn new(agent: Box<dyn Agent>, context: AgentContext) -> Self {
        Self { agent, context }
    }
}

/// Builds a fresh agent for every run.
pub type AgentFactory = Box<dyn Fn() -> Result<PreparedAgent, AgentError> + Send + Sync>;

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EvalProgress {
    /// Questions fetched, processing starting.
    Started {
        /// Number of fetched questions, including ones that will be skipped.
        total: usize,
    },
    /// A question is about to be answered.
    QuestionStarted {
        /// Zero-based position in the fetched list.
        index: usize,
        /// Task being answered.
        task_id: String,
    },
    /// A question finished (success or failure).
    QuestionCompleted {
        /// Questions processed so far.
        completed: usize,
        /// Number of fetched questions.
        total: usize,
        /// Whether the agent produced an answer.
        success: bool,
    },
    /// Sleeping before the next question.
    Waiting {
        /// Length of the pause.
        seconds: u64,
    },
    /// Sending the answers.
    Submitting {
        /// Number of answers in the payload.
        answers: usize,
    },
}

/// How a run ended.
#[derive(Debug)]
#[non_exhaustive]
pub enum RunStatus {
    /// No user identity was given
    NotLoggedIn,

    /// The agent could not be constructed
    AgentInit(AgentError),

    /// The question list could not be fetched
    Fetch(FetchError),

    /// Every question was skipped or failed
    NothingToSubmit,

    /// Answers were scored
    Submitted(ScoreReport),

    /// The submission failed
    Submission(SubmitError),
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::NotLoggedIn => {
                write!(f, "Please log in: no username was provided for the submission.")
            }
            RunStatus::AgentInit(e) => write!(f, "Error initializing agent: {}", e),
            RunStatus::Fetch(e) => write!(f, "{}", e),
            RunStatus::NothingToSubmit => {
                write!(f, "Agent did not produce any answers to submit.")
            }
            RunStatus::Submitted(report) => write!(f, "{}", report),
            RunStatus::Submission(e) => write!(f, "{}", e),
        }
    }
}

/// The two outputs of a run plus diagnostics.
#[derive(Debug)]
pub struct RunReport {
    pub status: RunStatus,

    /// Results table; `None` when the run ended before processing questions
    pub results: Option<Vec<ResultLogEntry>>,

    /// Answers that were (or would have been) submitted
    pub answers: Vec<AnswerRecord>,

    /// Where the answers were saved, if saving succeeded
    pub answers_file: Option<PathBuf>,
}

impl RunReport {
    fn early(status: RunStatus) -> Self {
        log::warn!("{}", status);
        Self {
            status,
            results: None,
            answers: Vec::new(),
            answers_file: None,
        }
    }

    /// The status line shown to the user.
    pub fn status_message(&self) -> String {
        self.status.to_string()
    }

    /// Whether the answers were submitted and scored.
    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Submitted(_))
    }
}

/// Runs one evaluation: fetch, answer, persist, submit.
///
/// # Example
///
/// ```no_run
/// use assay_eval::{EvalConfig, Orchestrator, PreparedAgent};
/// use assay_core::AgentError;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let orchestrator = Orchestrator::new(EvalConfig::default(), || {
///     Err::<PreparedAgent, _>(AgentError::Setup("no agent configured".into()))
/// })?;
/// let report = orchestrator.run_evaluation(Some("alice")).await;
/// println!("{}", report.status_message());
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    config: EvalConfig,
    client: ScoringClient,
    fetcher: AttachmentFetcher,
    factory: AgentFactory,
    runner: AgentRunner,
}

impl Orchestrator {
    /// Create an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration is invalid.
    pub fn new<F>(config: EvalConfig, factory: F) -> Result<Self, ConfigError>
    where
        F: Fn() -> Result<PreparedAgent, AgentError> + Send + Sync + 'static,
    {
        config.validate()?;
        let client = ScoringClient::new(config.clone());
        Ok(Self {
            fetcher: AttachmentFetcher::new(client.clone()),
            client,
            config,
            factory: Box::new(factory),
            runner: AgentRunner::new(),
        })
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Run the evaluation for `user_identity`.
    pub async fn run_evaluation(&self, user_identity: Option<&str>) -> RunReport {
        self.run_evaluation_with_progress(user_identity, |_| {})
            .await
    }

    /// Same as [`run_evaluation`](Self::run_evaluation), reporting progress
    /// through `on_progress`.
    pub async fn run_evaluation_with_progress<F>(
        &self,
        user_identity: Option<&str>,
        on_progress: F,
    ) -> RunReport
    where
        F: Fn(EvalProgress) + Send + Sync,
    {
        let Some(username) = user_identity
            .map(str::trim)
            .filter(|name| !name.is_empty())
        else {
            return RunReport::early(RunStatus::NotLoggedIn);
        };
        log::info!("User logged in: {}", username);

        let prepared = match (self.factory)() {
            Ok(prepared) => prepared,
            Err(e) => return RunReport::early(RunStatus::AgentInit(e)),
        };
        log::info!("Agent '{}' ready", prepared.agent.name());

        let questions = match self.client.fetch_questions().await {
            Ok(questions) => questions,
            Err(e) => return RunReport::early(RunStatus::Fetch(e)),
        };

        let (answers, results) = self.answer_all(&prepared, &questions, &on_progress).await;

        if answers.is_empty() {
            log::warn!("Agent did not produce any answers to submit");
            return RunReport {
                status: RunStatus::NothingToSubmit,
                results: Some(results),
                answers,
                answers_file: None,
            };
        }

        let answers_file = match save_answers(&self.config.output_dir, &answers).await {
            Ok(path) => {
                log::info!("Answers saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::error!("Error saving answers to file: {}", e);
                None
            }
        };

        let payload = SubmissionPayload {
            username: username.to_string(),
            agent_code: self.config.agent_code_url(),
            answers,
        };
        on_progress(EvalProgress::Submitting {
            answers: payload.answers.len(),
        });
        log::info!(
            "Agent finished. Submitting {} answers for user '{}'",
            payload.answers.len(),
            username
        );

        let status = match self.client.submit(&payload).await {
            Ok(report) => {
                log::info!("Submission successful");
                RunStatus::Submitted(report)
            }
            Err(e) => {
                log::error!("{}", e);
                RunStatus::Submission(e)
            }
        };

        RunReport {
            status,
            results: Some(results),
            answers: payload.answers,
            answers_file,
        }
    }

    /// Answer every valid question in order.
    async fn answer_all<F>(
        &self,
        prepared: &PreparedAgent,
        questions: &[QuestionItem],
        on_progress: &F,
    ) -> (Vec<AnswerRecord>, Vec<ResultLogEntry>)
    where
        F: Fn(EvalProgress) + Send + Sync,
    {
        let total = questions.len();
        let mut answers = Vec::new();
        let mut results = Vec::new();
        let mut completed = 0;

        on_progress(EvalProgress::Started { total });
        log::info!("Running agent on {} questions", total);

        for (index, item) in questions.iter().enumerate() {
            let (Some(task_id), Some(question)) = (
                item.task_id.as_deref().filter(|id| !id.is_empty()),
                item.question.as_deref(),
            ) else {
                log::warn!("Skipping item with missing task_id or question: {:?}", item);
                continue;
            };

            on_progress(EvalProgress::QuestionStarted {
                index,
                task_id: task_id.to_string(),
            });

            let outcome = self.answer_one(prepared, task_id, question, item).await;
            let success = outcome.is_ok();
            match outcome {
                Ok((prompt, answer)) => {
                    answers.push(AnswerRecord {
                        task_id: task_id.to_string(),
                        submitted_answer: answer.clone(),
                    });
                    results.push(ResultLogEntry {
                        task_id: task_id.to_string(),
                        question: prompt,
                        submitted_answer: answer,
                    });
                }
                Err((prompt, error)) => results.push(ResultLogEntry {
                    task_id: task_id.to_string(),
                    question: prompt,
                    submitted_answer: error,
                }),
            }

            completed += 1;
            on_progress(EvalProgress::QuestionCompleted {
                completed,
                total,
                success,
            });

            if !self.config.item_delay.is_zero() {
                on_progress(EvalProgress::Waiting {
                    seconds: self.config.item_delay.as_secs(),
                });
                tokio::time::sleep(self.config.item_delay).await;
            }
        }

        (answers, results)
    }

    /// Download the attachment if any, then ask the agent.
    ///
    /// Returns the prompt given to the agent with either the answer or the
    /// error text for the results table.
    async fn answer_one(
        &self,
        prepared: &PreparedAgent,
        task_id: &str,
        question: &str,
        item: &QuestionItem,
    ) -> Result<(String, String), (String, String)> {
        let mut prompt = question.to_string();

        if let Some(file_name) = item.attachment() {
            match self.fetcher.fetch_attachment(task_id, file_name).await {
                Ok(AttachmentOutcome::Saved { .. }) => {}
                Ok(other) => log::warn!("Attachment for task {} not saved: {:?}", task_id, other),
                Err(e) => {
                    log::error!("Error downloading attachment for task {}: {}", task_id, e);
                    return Err((prompt, format!("DOWNLOAD ERROR: {}", e)));
                }
            }
            let local_path = self.fetcher.local_path(file_name);
            prompt.push_str(&format!(" The file path is: {}", local_path.display()));
        }

        match self
            .runner
            .answer(
                prepared.agent.as_ref(),
                &prompt,
                prepared.context.clone(),
            )
            .await
        {
            Ok(answer) => Ok((prompt, answer)),
            Err(e) => {
                log::error!("Error running agent on task {}: {}", task_id, e);
                Err((prompt, format!("AGENT ERROR: {}", e)))
            }
        }
    }
}
