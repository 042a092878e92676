//! Seconds-to-text formatting for the position and duration labels.

/// Text shown wherever no meaningful time value exists yet.
pub const SENTINEL: &str = "00:00";

/// Format `seconds` as `[HH:]MM:SS`.
///
/// Returns `None` for zero, negative or non-finite input; callers substitute
/// [`SENTINEL`]. Hours are omitted entirely when zero.
pub fn format_seconds(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }

    // Round the total first so 59.6s becomes 01:00 instead of 00:60.
    let total = seconds.round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours == 0 {
        Some(format!("{:02}:{:02}", minutes, secs))
    } else {
        Some(format!("{:02}:{:02}:{:02}", hours, minutes, secs))
    }
}

/// Format an optional value, falling back to [`SENTINEL`].
pub fn or_sentinel(seconds: Option<f64>) -> String {
    seconds
        .and_then(format_seconds)
        .unwrap_or_else(|| SENTINEL.to_string())
}
