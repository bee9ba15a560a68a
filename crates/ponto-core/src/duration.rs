//! Elapsed-time accounting and human-readable duration strings.

use chrono::{DateTime, Duration, TimeZone};

/// Date format used in finished records (`DD/MM/YYYY`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Time-of-day format used in finished records (24h `HH:MM:SS`).
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Format of the start timestamp shown on status cards.
pub const CARD_TIMESTAMP_FORMAT: &str = "%d %B %Y %H:%M";

/// Returns the time elapsed from `from` to `to`.
///
/// Clamped to zero when `to` precedes `from` (e.g. the wall clock was stepped
/// backwards between two actions).
pub fn elapsed<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> Duration {
    let delta = to.clone().signed_duration_since(from.clone());
    delta.max(Duration::zero())
}

/// Formats a duration as `"1 hour, 1 minute, 1 second"`.
///
/// Zero components are omitted. A zero (or negative) duration renders as
/// `"0 seconds"` so the result is never empty. Sub-second precision is dropped.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(unit(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(unit(minutes, "minute"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(unit(seconds, "second"));
    }
    parts.join(", ")
}

fn unit(value: i64, name: &str) -> String {
    if value == 1 {
        format!("{value} {name}")
    } else {
        format!("{value} {name}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn formats_every_unit() {
        assert_eq!(
            format_duration(Duration::seconds(3661)),
            "1 hour, 1 minute, 1 second"
        );
        assert_eq!(
            format_duration(Duration::seconds(2 * 3600 + 30 * 60)),
            "2 hours, 30 minutes"
        );
    }

    #[test]
    fn zero_renders_seconds() {
        assert_eq!(format_duration(Duration::zero()), "0 seconds");
        assert_eq!(format_duration(Duration::milliseconds(999)), "0 seconds");
    }

    #[test]
    fn single_components() {
        assert_eq!(format_duration(Duration::seconds(59)), "59 seconds");
        assert_eq!(format_duration(Duration::seconds(60)), "1 minute");
        assert_eq!(format_duration(Duration::hours(1)), "1 hour");
        assert_eq!(format_duration(Duration::hours(30)), "30 hours");
    }

    #[test]
    fn never_empty() {
        for secs in [0, 1, 59, 60, 61, 3599, 3600, 3601, 86_400] {
            let formatted = format_duration(Duration::seconds(secs));
            assert!(!formatted.is_empty(), "empty output for {secs}s");
            assert_eq!(formatted == "0 seconds", secs == 0);
        }
    }

    #[test]
    fn elapsed_is_clamped() {
        let a = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap();
        assert_eq!(elapsed(&a, &b), Duration::minutes(30));
        assert_eq!(elapsed(&b, &a), Duration::zero());
    }
}
