//! Display helpers shared by the engine views and statistics.

/// Formats seconds as `MM:SS`. Minutes are not wrapped into hours, so a
/// four-hour countdown shows as `240:00`. Negative input shows `00:00`.
pub fn format_mmss(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whole minutes for a number of seconds, rounded half away from zero.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the float cast saturates; real totals are far inside the i64 range"
)]
pub fn secs_to_minutes(secs: i64) -> i64 {
    (secs as f64 / 60.0).round() as i64
}
