//! Wire and report types of an evaluation run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A question as served by the scoring service.
///
/// Every field is optional on the wire: items without a task id or question
/// are skipped by the orchestrator rather than failing the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionItem {
    #[serde(default)]
    pub task_id: Option<String>,

    #[serde(default)]
    pub question: Option<String>,

    /// Name of the attached file; empty or absent when there is none
    #[serde(default)]
    pub file_name: Option<String>,
}

impl QuestionItem {
    pub fn new(task_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            task_id: Some(task_id.into()),
            question: Some(question.into()),
            file_name: None,
        }
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// The attachment name, if it is present and non-empty.
    pub fn attachment(&self) -> Option<&str> {
        self.file_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// One submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub task_id: String,
    pub submitted_answer: String,
}

/// One row of the human-facing results table.
///
/// Failed items carry an error string in `submitted_answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLogEntry {
    pub task_id: String,
    pub question: String,
    pub submitted_answer: String,
}

/// Body of the submission request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub username: String,
    pub agent_code: String,
    pub answers: Vec<AnswerRecord>,
}

/// Score returned by the scoring service after a submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    #[serde(default)]
    pub username: Option<String>,

    /// Percentage of correct answers
    #[serde(default)]
    pub score: Option<f64>,

    #[serde(default)]
    pub correct_count: Option<u64>,

    #[serde(default)]
    pub total_attempted: Option<u64>,

    #[serde(default)]
    pub message: Option<String>,
}

fn or_placeholder<T: ToString>(value: &Option<T>, placeholder: &str) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| placeholder.to_string())
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Submission Successful!")?;
        writeln!(f, "User: {}", or_placeholder(&self.username, "N/A"))?;
        writeln!(
            f,
            "Overall Score: {}% ({}/{} correct)",
            or_placeholder(&self.score, "N/A"),
            or_placeholder(&self.correct_count, "?"),
            or_placeholder(&self.total_attempted, "?")
        )?;
        write!(
            f,
            "Message: {}",
            or_placeholder(&self.message, "No message received.")
        )
    }
}
