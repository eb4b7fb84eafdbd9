use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Finalized figures for one completed session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub work_seconds: u64,
    pub pause_seconds: u64,
    /// Integer percentage of work over (work + pause) time.
    pub productivity: u8,
    pub description: Option<String>,
}

/// Summed figures over one user's completed sessions for a day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub total_work_seconds: u64,
    pub total_pause_seconds: u64,
    pub sessions_count: usize,
    pub productivity: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBreakdown {
    pub date: NaiveDate,
    pub stats: DailyStats,
}

/// Per-day breakdown plus grand totals for a trailing 7-day window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub days: Vec<DayBreakdown>,
    pub totals: DailyStats,
}
