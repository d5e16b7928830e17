//! File reading tools: plain text ([`FileRead`]) and spreadsheets
//! ([`SpreadsheetRead`]).
//!
//! Both accept absolute paths and paths relative to the working directory,
//! since task attachments are downloaded next to the process.

mod spreadsheet;

pub use spreadsheet::SpreadsheetRead;

use assay_core::tool::{Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;

/// Maximum file size to read (1MB).
const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Extract and check the `path` argument shared by the file tools.
pub(crate) async fn existing_file<'a>(input: &'a Value) -> Result<&'a Path, ToolError> {
    let path_str = input
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidInput("Missing 'path' field".into()))?;

    if path_str.trim().is_empty() {
        return Err(ToolError::InvalidInput("Path cannot be empty".into()));
    }

    let path = Path::new(path_str);
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolError::NotFound(format!("File not found: {}", path_str)));
        }
        Err(e) => {
            return Err(ToolError::ExecutionFailed(format!(
                "Failed to get file metadata: {}",
                e
            )));
        }
    };

    if !metadata.is_file() {
        return Err(ToolError::InvalidInput(format!(
            "Path is not a file: {}",
            path_str
        )));
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(ToolError::InvalidInput(format!(
            "File too large ({} bytes, max {} bytes)",
            metadata.len(),
            MAX_FILE_SIZE
        )));
    }

    Ok(path)
}

/// FileRead tool for reading text files such as Python sources.
///
/// # Example
///
/// ```no_run
/// use assay_file_read::FileRead;
/// use assay_core::tool::Tool;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = FileRead.execute(json!({"path": "script.py"})).await?;
/// println!("File contents: {}", result.content);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRead;

#[async_trait]
impl Tool for FileRead {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read a text file (for example a Python source file) and return its contents. \
         Has a 1MB size limit."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file to read"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let path = existing_file(&input).await?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to read file: {}", e)))?;

        log::debug!("Read {} bytes from {}", content.len(), path.display());
        Ok(ToolResult::new(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_file_read_success() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "print('Hello, World!')").unwrap();
        let path = temp.path().to_str().unwrap();

        let result = FileRead.execute(json!({"path": path})).await.unwrap();
        assert!(result.content.contains("Hello, World!"));
    }

    #[tokio::test]
    async fn test_file_read_relative_path() {
        let cwd = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir_in(&cwd).unwrap();
        let file = dir.path().join("snippet.py");
        std::fs::write(&file, "x = 1\n").unwrap();
        let relative = file.strip_prefix(&cwd).unwrap();
        assert!(relative.is_relative());

        let result = FileRead
            .execute(json!({"path": relative.to_str().unwrap()}))
            .await
            .unwrap();
        assert_eq!(result.content, "x = 1\n");
    }

    #[rstest]
    #[case::missing(json!({}))]
    #[case::empty(json!({"path": ""}))]
    #[case::not_a_string(json!({"path": 42}))]
    #[tokio::test]
    async fn test_file_read_bad_path_input(#[case] input: Value) {
        let err = FileRead.execute(input).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_file_read_not_found() {
        let err = FileRead
            .execute(json!({"path": "/nonexistent/file.txt"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_file_read_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileRead
            .execute(json!({"path": dir.path().to_str().unwrap()}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_file_read_too_large() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&vec![b'a'; (MAX_FILE_SIZE + 1) as usize])
            .unwrap();

        let err = FileRead
            .execute(json!({"path": temp.path().to_str().unwrap()}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(ref m) if m.contains("too large")));
    }

    #[test]
    fn test_file_read_parameters_schema() {
        let schema = FileRead.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema["required"]
            .as_array()
            .unwrap()
            .contains(&json!("path")));
    }
}
