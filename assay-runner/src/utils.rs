use std::time::Duration;

/// Format a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 10.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}s", secs)
    }
}
