//! Error types for the evaluation run.
//!
//! The `Display` text of each error is the status line shown to the user, so
//! the messages are written as complete sentences.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while fetching the question list. Each one ends the run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Connection, DNS or timeout failure
    #[error("Error fetching questions: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("Error fetching questions: server responded with status {0}")]
    Status(u16),

    /// Body is not a JSON array of questions
    #[error("Error decoding server response for questions: {0}")]
    Decode(String),

    /// The server returned no questions
    #[error("Fetched questions list is empty or invalid format.")]
    Empty,
}

/// Server-provided explanation attached to a failed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// The `detail` field of a JSON error body (or the whole body if absent)
    Detail(String),

    /// Leading part of a body that was not JSON
    Response(String),
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetail::Detail(detail) => write!(f, "Detail: {}", detail),
            ErrorDetail::Response(text) => write!(f, "Response: {}", text),
        }
    }
}

/// Failures while submitting answers. Reported as the final status.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    /// Non-2xx response
    #[error("Submission Failed: Server responded with status {status}. {detail}")]
    Http { status: u16, detail: ErrorDetail },

    /// The request exceeded the submission timeout
    #[error("Submission Failed: The request timed out.")]
    Timeout,

    /// Connection or other transport failure
    #[error("Submission Failed: Network error - {0}")]
    Network(String),

    /// Anything else, such as an undecodable success body
    #[error("An unexpected error occurred during submission: {0}")]
    Unexpected(String),
}

/// Failures while downloading an attachment.
///
/// Non-2xx responses and unsupported file types are outcomes, not errors;
/// see [`AttachmentOutcome`](crate::AttachmentOutcome).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttachmentError {
    /// The file name would escape the attachment directory
    #[error("Refusing to write attachment to '{0}'")]
    InvalidFileName(String),

    /// Connection failure or interrupted body
    #[error("Failed to download attachment: {0}")]
    Transport(#[from] reqwest::Error),

    /// Could not write the file
    #[error("Failed to write attachment to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid configuration or unreadable config file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {error}")]
    Io { path: PathBuf, error: String },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config file {path}: {error}")]
    Parse { path: PathBuf, error: String },

    /// One or more settings are out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::transport(FetchError::Transport("dns".into()), "Error fetching questions: dns")]
    #[case::status(FetchError::Status(502), "Error fetching questions: server responded with status 502")]
    #[case::decode(FetchError::Decode("eof".into()), "Error decoding server response for questions: eof")]
    #[case::empty(FetchError::Empty, "Fetched questions list is empty or invalid format.")]
    fn test_fetch_error_messages(#[case] error: FetchError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::detail(
        SubmitError::Http { status: 500, detail: ErrorDetail::Detail("bad payload".into()) },
        "Submission Failed: Server responded with status 500. Detail: bad payload"
    )]
    #[case::response(
        SubmitError::Http { status: 502, detail: ErrorDetail::Response("<html>".into()) },
        "Submission Failed: Server responded with status 502. Response: <html>"
    )]
    #[case::timeout(SubmitError::Timeout, "Submission Failed: The request timed out.")]
    #[case::network(SubmitError::Network("reset".into()), "Submission Failed: Network error - reset")]
    #[case::unexpected(
        SubmitError::Unexpected("eof".into()),
        "An unexpected error occurred during submission: eof"
    )]
    fn test_submit_error_messages(#[case] error: SubmitError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
