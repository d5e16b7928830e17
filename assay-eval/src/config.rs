//! Run configuration and the optional `assay.toml` file.
//!
//! [`EvalConfig`] is built once at startup and handed to the
//! [`Orchestrator`](crate::Orchestrator). [`FileConfig`] mirrors the tunable
//! settings with serde-friendly types (seconds instead of `Duration`); every
//! field is optional so a file only needs to name what it changes.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default scoring service.
pub const DEFAULT_API_URL: &str = "https://agents-course-unit4-scoring.hf.space";

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "assay.toml";

/// Space id used in the agent code URL when none is configured.
const LOCAL_SPACE_ID: &str = "local";

/// Configuration for one evaluation run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct EvalConfig {
    /// Base URL of the scoring service
    ///
    /// Default: [`DEFAULT_API_URL`]
    pub api_url: String,

    /// Hosting space of the agent code, used to build `agent_code`
    pub space_id: Option<String>,

    /// Pause after every processed question
    ///
    /// Default: 100 seconds
    pub item_delay: Duration,

    /// Timeout of the question list request
    ///
    /// Default: 15 seconds
    pub questions_timeout: Duration,

    /// Timeout of the submission request
    ///
    /// Default: 60 seconds
    pub submit_timeout: Duration,

    /// Directory receiving `answers_<timestamp>.json`
    ///
    /// Default: current directory
    pub output_dir: PathBuf,

    /// Directory receiving downloaded attachments; `None` writes them to the
    /// working directory under their own file name
    pub attachment_dir: Option<PathBuf>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            space_id: None,
            item_delay: Duration::from_secs(100),
            questions_timeout: Duration::from_secs(15),
            submit_timeout: Duration::from_secs(60),
            output_dir: PathBuf::from("."),
            attachment_dir: None,
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    #[must_use]
    pub fn with_space_id(mut self, space_id: Option<String>) -> Self {
        self.space_id = space_id;
        self
    }

    #[must_use]
    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    #[must_use]
    pub fn with_questions_timeout(mut self, timeout: Duration) -> Self {
        self.questions_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_attachment_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.attachment_dir = dir;
        self
    }

    /// Validate the configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let api_url = self.api_url.trim();
        if api_url.is_empty() {
            errors.push("api_url must not be empty".to_string());
        } else if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            errors.push(format!("api_url must be an http(s) URL, got '{}'", api_url));
        }
        if self.questions_timeout.is_zero() {
            errors.push("questions timeout must be greater than zero".to_string());
        }
        if self.submit_timeout.is_zero() {
            errors.push("submit timeout must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }

    fn base(&self) -> &str {
        self.api_url.trim().trim_end_matches('/')
    }

    pub fn questions_url(&self) -> String {
        format!("{}/questions", self.base())
    }

    pub fn submit_url(&self) -> String {
        format!("{}/submit", self.base())
    }

    pub fn file_url(&self, task_id: &str) -> String {
        format!("{}/files/{}", self.base(), task_id)
    }

    /// Link to the agent's source, sent with the submission.
    pub fn agent_code_url(&self) -> String {
        let space = self
            .space_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(LOCAL_SPACE_ID);
        format!("https://huggingface.co/spaces/{}/tree/main", space)
    }
}

/// Root of `assay.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct FileConfig {
    pub eval: EvalToml,
    pub llm: LlmToml,
    pub tool_agent: ToolAgentToml,
}

/// `[eval]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct EvalToml {
    pub api_url: Option<String>,
    pub space_id: Option<String>,
    pub item_delay_secs: Option<u64>,
    pub questions_timeout_secs: Option<u64>,
    pub submit_timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub attachment_dir: Option<PathBuf>,
}

/// `[llm]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct LlmToml {
    pub model: Option<String>,
    pub media_model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub max_retries: Option<u32>,
}

/// `[tool_agent]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct ToolAgentToml {
    pub max_steps: Option<usize>,
    pub system_prompt: Option<String>,
    pub final_answer_check: Option<bool>,
    /// Restrict the agent to these tools
    pub tools: Option<Vec<String>>,
}

impl FileConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load `explicit` if given, otherwise `assay.toml` in `dir` if it exists.
    ///
    /// Returns the config together with the path it came from. An explicit
    /// path that does not exist is an error; a missing default file is not.
    pub fn discover(
        explicit: Option<&Path>,
        dir: &Path,
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let default_path = dir.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            log::info!("Loading config from {}", default_path.display());
            return Ok((Self::load(&default_path)?, Some(default_path)));
        }
        Ok((Self::default(), None))
    }

    /// Apply the `[eval]` section on top of `config`.
    pub fn apply_eval(&self, mut config: EvalConfig) -> EvalConfig {
        let eval = &self.eval;
        if let Some(url) = &eval.api_url {
            config.api_url = url.clone();
        }
        if eval.space_id.is_some() {
            config.space_id = eval.space_id.clone();
        }
        if let Some(secs) = eval.item_delay_secs {
            config.item_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = eval.questions_timeout_secs {
            config.questions_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = eval.submit_timeout_secs {
            config.submit_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = &eval.output_dir {
            config.output_dir = dir.clone();
        }
        if eval.attachment_dir.is_some() {
            config.attachment_dir = eval.attachment_dir.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EvalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.item_delay, Duration::from_secs(100));
        assert_eq!(config.questions_timeout, Duration::from_secs(15));
        assert_eq!(config.submit_timeout, Duration::from_secs(60));
        assert!(config.attachment_dir.is_none());
    }

    #[rstest]
    #[case::plain("https://scoring.example")]
    #[case::trailing_slash("https://scoring.example/")]
    fn test_urls(#[case] base: &str) {
        let config = EvalConfig::new().with_api_url(base);
        assert_eq!(config.questions_url(), "https://scoring.example/questions");
        assert_eq!(config.submit_url(), "https://scoring.example/submit");
        assert_eq!(config.file_url("t-1"), "https://scoring.example/files/t-1");
    }

    #[rstest]
    #[case::configured(Some("me/my-agent"), "https://huggingface.co/spaces/me/my-agent/tree/main")]
    #[case::missing(None, "https://huggingface.co/spaces/local/tree/main")]
    #[case::blank(Some("  "), "https://huggingface.co/spaces/local/tree/main")]
    fn test_agent_code_url(#[case] space_id: Option<&str>, #[case] expected: &str) {
        let config = EvalConfig::new().with_space_id(space_id.map(String::from));
        assert_eq!(config.agent_code_url(), expected);
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = EvalConfig::new()
            .with_api_url("")
            .with_submit_timeout(Duration::ZERO);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("api_url"));
        assert!(err.contains("submit timeout"));

        let err = EvalConfig::new()
            .with_api_url("ftp://nope")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_parse_full_file() {
        let config: FileConfig = toml::from_str(
            r#"
            [eval]
            api_url = "http://localhost:8000"
            item_delay_secs = 0

            [llm]
            model = "gemini-2.5-flash"
            temperature = 0.0

            [tool_agent]
            max_steps = 4
            tools = ["calculator", "web_fetch"]
            "#,
        )
        .unwrap();

        assert_eq!(config.eval.item_delay_secs, Some(0));
        assert_eq!(config.llm.model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(config.tool_agent.max_steps, Some(4));

        let eval = config.apply_eval(EvalConfig::default());
        assert_eq!(eval.api_url, "http://localhost:8000");
        assert_eq!(eval.item_delay, Duration::ZERO);
        assert_eq!(eval.submit_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(toml::from_str::<FileConfig>("[eval]\nitem_delay = 3").is_err());
    }

    #[test]
    fn test_discover() {
        let dir = TempDir::new().unwrap();

        let (config, path) = FileConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config, FileConfig::default());
        assert!(path.is_none());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[tool_agent]\nmax_steps = 3\n").unwrap();
        let (config, path) = FileConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.tool_agent.max_steps, Some(3));
        assert!(path.is_some());

        let missing = dir.path().join("missing.toml");
        let err = FileConfig::discover(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[eval\n").unwrap();
        let err = FileConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }
}
