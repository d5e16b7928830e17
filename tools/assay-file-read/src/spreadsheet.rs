use crate::existing_file;
use assay_core::tool::{Tool, ToolError, ToolResult};
use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Range, Reader};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Reads every sheet of an `.xlsx`, `.xls` or `.ods` workbook.
///
/// Each sheet is rendered as a header line `## Sheet: <name>` followed by
/// its rows, cells separated by tabs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetRead;

/// Render a sheet as tab-separated rows.
pub(crate) fn render_range(range: &Range<Data>) -> String {
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn read_workbook(path: PathBuf) -> Result<String, ToolError> {
    let mut workbook = open_workbook_auto(&path).map_err(|e| {
        ToolError::ExecutionFailed(format!("Error reading the spreadsheet: {}", e))
    })?;

    let mut sections = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(|e| {
            ToolError::ExecutionFailed(format!("Error reading sheet '{}': {}", name, e))
        })?;
        sections.push(format!("## Sheet: {}\n{}", name, render_range(&range)));
    }

    if sections.is_empty() {
        return Err(ToolError::ExecutionFailed(
            "Spreadsheet contains no sheets".into(),
        ));
    }

    Ok(sections.join("\n\n"))
}

#[async_trait]
impl Tool for SpreadsheetRead {
    fn name(&self) -> &str {
        "spreadsheet_read"
    }

    fn description(&self) -> &str {
        "Read an Excel or OpenDocument spreadsheet (.xlsx, .xls, .ods) and return \
         every sheet as a tab-separated table."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the spreadsheet file"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let path = existing_file(&input).await?.to_path_buf();
        log::debug!("Reading workbook {}", path.display());

        // calamine is synchronous
        let content = tokio::task::spawn_blocking(move || read_workbook(path))
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Spreadsheet task failed: {}", e)))??;

        Ok(ToolResult::new(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_render_range() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("Item".into()));
        range.set_value((0, 1), Data::String("Sales".into()));
        range.set_value((1, 0), Data::String("Burgers".into()));
        range.set_value((1, 1), Data::Float(1520.5));
        range.set_value((2, 0), Data::String("Soda".into()));
        range.set_value((2, 1), Data::Int(300));

        assert_eq!(
            render_range(&range),
            "Item\tSales\nBurgers\t1520.5\nSoda\t300"
        );
    }

    #[test]
    fn test_render_range_with_gaps() {
        let mut range: Range<Data> = Range::new((0, 0), (0, 2));
        range.set_value((0, 0), Data::String("a".into()));
        range.set_value((0, 2), Data::String("c".into()));

        assert_eq!(render_range(&range), "a\t\tc");
    }

    #[tokio::test]
    async fn test_spreadsheet_not_found() {
        let err = SpreadsheetRead
            .execute(json!({"path": "/nonexistent/sales.xlsx"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_spreadsheet_invalid_content() {
        let mut temp = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        temp.write_all(b"not a zip archive").unwrap();

        let err = SpreadsheetRead
            .execute(json!({"path": temp.path().to_str().unwrap()}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(ref m) if m.contains("spreadsheet")));
    }

    #[test]
    fn test_spreadsheet_schema() {
        assert_eq!(SpreadsheetRead.name(), "spreadsheet_read");
        assert!(SpreadsheetRead.parameters_schema()["properties"]["path"].is_object());
    }
}
