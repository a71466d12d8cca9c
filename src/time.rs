/// Formats a millisecond count as `MM:SS`, or `HH:MM:SS` once it reaches an hour.
///
/// Zero and negative values (the engine reports `-1` for unknown lengths) render as `00:00`.
pub fn format_ms(ms: i64) -> String {
    if ms <= 0 {
        return "00:00".to_owned();
    }
    let secs = ms / 1000;
    let (mins, secs) = (secs / 60, secs % 60);
    let (hours, mins) = (mins / 60, mins % 60);
    if hours > 0 {
        format!("{hours:02}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}

/// `elapsed / total` as shown next to the seek slider.
pub fn format_progress(elapsed_ms: i64, total_ms: i64) -> String {
    format!("{} / {}", format_ms(elapsed_ms), format_ms(total_ms))
}
