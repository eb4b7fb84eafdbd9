use chrono::{DateTime, NaiveDate, Utc};

/// Day-scale durations: "7h 30m".
pub fn format_hours_minutes(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{hours}h {minutes}m")
}

/// Break-scale durations: "4m 32s".
pub fn format_minutes_seconds(seconds: u64) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("{minutes}m {secs}s")
}

pub fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%H:%M").to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}
