//! Human-readable durations for build summaries.

use std::time::Duration;

/// Format a build duration.
///
/// Milliseconds under a second, seconds with two decimals under a minute,
/// then whole minutes plus the remaining seconds.
///
/// ```
/// use std::time::Duration;
/// use memo_bundler::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_millis(65_000)), "1m 5.00s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let minutes = duration.as_secs() / 60;
        let seconds = duration.as_secs_f64() - (minutes * 60) as f64;
        format!("{}m {:.2}s", minutes, seconds)
    }
}
