use assay_core::tool::ToolError;
use regex::Regex;

/// Line width used when rendering HTML; wide enough to keep table rows intact.
const TEXT_WIDTH: usize = 120;

/// Render an HTML document as plain text.
///
/// Entities are decoded, table cells keep their column separators and links
/// are listed as numbered references.
///
/// # Errors
///
/// Returns [`ToolError::ExecutionFailed`] if the document cannot be rendered.
pub fn html_to_text(html: &str) -> Result<String, ToolError> {
    let text = html2text::from_read(html.as_bytes(), TEXT_WIDTH)
        .map_err(|e| ToolError::ExecutionFailed(format!("Failed to convert HTML: {}", e)))?;
    collapse_blank_lines(text.trim())
}

/// Collapse runs of three or more newlines into two.
pub(crate) fn collapse_blank_lines(text: &str) -> Result<String, ToolError> {
    let blank_runs = Regex::new(r"\n{3,}").map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
    Ok(blank_runs.replace_all(text, "\n\n").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::paragraphs("<p>one</p><p>two</p>", "one\n\ntwo")]
    #[case::line_break("a<br/>b", "a\nb")]
    fn test_html_to_text(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(html_to_text(html).unwrap(), expected);
    }

    #[test]
    fn test_entities_are_decoded() {
        let text =
            html_to_text("<p>It&#8217;s 5&nbsp;km &mdash; caf&eacute; &copy;2024 &lt;b&gt; &amp;</p>")
                .unwrap();

        assert!(text.contains("It\u{2019}s"), "got: {}", text);
        assert!(text.contains('\u{2014}'));
        assert!(text.contains("café"));
        assert!(text.contains("©2024"));
        assert!(text.contains("<b>"));
        assert!(!text.contains("&mdash;") && !text.contains("&#8217;") && !text.contains("&amp;"));
    }

    #[test]
    fn test_table_cells_stay_separated() {
        let html = "<table>\
                    <tr><th>Year</th><th>Album</th></tr>\
                    <tr><td>1962</td><td>Yo no canto por cantar</td></tr>\
                    </table>";
        let text = html_to_text(html).unwrap();

        assert!(text.contains("Year") && text.contains("Album"), "got: {}", text);
        assert!(text.contains("1962") && text.contains("Yo no canto por cantar"));
        assert!(!text.contains("YearAlbum"));
        assert!(!text.contains("1962Yo"));
        let row = text.lines().find(|line| line.contains("1962")).unwrap();
        assert!(row.contains("Yo no canto"), "cells of a row share a line: {}", text);
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\nc").unwrap(), "a\n\nb\nc");
    }
}
