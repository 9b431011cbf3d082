//! Timing and formatting utilities

use chrono::Utc;
use std::time::Duration;

/// Current wall-clock time as Unix milliseconds.
///
/// Used for output file name suffixes, so two writers opened in the same
/// millisecond for the same partition would collide; partitions each own
/// their writer, which rules that out.
pub fn unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a duration in human-readable form (ns, us, ms, s)
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2}us", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}
