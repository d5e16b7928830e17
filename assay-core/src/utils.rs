//! Text helpers shared across crates.

/// Marker the model is asked to put in front of its final answer.
pub const FINAL_ANSWER_MARKER: &str = "FINAL ANSWER:";

/// Truncate text to a maximum character count, adding ellipsis if needed.
///
/// Counts Unicode characters and trims surrounding whitespace.
///
/// ```
/// use assay_core::truncate;
///
/// assert_eq!(truncate("hello world", 8), "hello...");
/// assert_eq!(truncate("short", 10), "short");
/// ```
pub fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated.trim_end())
    }
}

/// Take the first `max_chars` characters without adding an ellipsis.
///
/// Used where the output must be a strict prefix of the input.
pub fn prefix_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Extract the answer following the last `FINAL ANSWER:` marker.
///
/// Matching is case-insensitive. Only the first line after the marker is
/// kept. Returns `None` when the marker is missing or nothing follows it.
///
/// ```
/// use assay_core::extract_final_answer;
///
/// assert_eq!(extract_final_answer("So... FINAL ANSWER: 42").as_deref(), Some("42"));
/// assert_eq!(extract_final_answer("no marker"), None);
/// ```
pub fn extract_final_answer(text: &str) -> Option<String> {
    let upper = text.to_ascii_uppercase();
    let start = upper.rfind(FINAL_ANSWER_MARKER)? + FINAL_ANSWER_MARKER.len();
    let answer = text[start..].trim().lines().next()?.trim();
    if answer.is_empty() {
        None
    } else {
        Some(answer.to_string())
    }
}
