//! Human-readable durations and timestamps.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Format a timestamp as a relative time string (e.g., "2 minutes ago").
pub fn format_relative_time(timestamp: DateTime<Utc>) -> String {
    format_relative_time_from(timestamp, Utc::now())
}

fn format_relative_time_from(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(timestamp).num_seconds();

    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }

    let days = hours / 24;
    if days == 1 {
        return "yesterday".to_string();
    }
    if days < 30 {
        return plural(days, "day");
    }

    let months = days / 30;
    if months < 12 {
        return plural(months, "month");
    }

    plural(months / 12, "year")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as Delta;

    fn ago(delta: Delta) -> String {
        let now = Utc::now();
        format_relative_time_from(now - delta, now)
    }

    #[test]
    fn relative_time_just_now() {
        assert_eq!(format_relative_time(Utc::now()), "just now");
        assert_eq!(ago(Delta::seconds(59)), "just now");
    }

    #[test]
    fn relative_time_future_is_just_now() {
        assert_eq!(ago(Delta::seconds(-30)), "just now");
    }

    #[test]
    fn relative_time_minutes_and_hours() {
        assert_eq!(ago(Delta::minutes(1)), "1 minute ago");
        assert_eq!(ago(Delta::minutes(5)), "5 minutes ago");
        assert_eq!(ago(Delta::hours(3)), "3 hours ago");
    }

    #[test]
    fn relative_time_days_months_years() {
        assert_eq!(ago(Delta::days(1)), "yesterday");
        assert_eq!(ago(Delta::days(10)), "10 days ago");
        assert_eq!(ago(Delta::days(65)), "2 months ago");
        assert_eq!(ago(Delta::days(800)), "2 years ago");
    }

    #[test]
    fn format_duration_units() {
        assert_eq!(format_duration(Duration::ZERO), "0ms");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs_f64(5.3)), "5.3s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }
}
