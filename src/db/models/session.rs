use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One work day record, from start to stop, net of pauses.
///
/// `end_time == None` means the session is still open. At most one open
/// session exists per user at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: String,
    pub user_id: i64,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    /// Accumulated duration of closed pauses, in whole seconds. Only
    /// ever grows.
    pub total_pause_seconds: u64,
    pub created_at: DateTime<Utc>,
}

impl WorkSession {
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Net work duration in seconds, once the session is finished.
    /// May be negative if the stored data is inconsistent; the stats
    /// layer treats that as a data-integrity fault.
    pub fn work_seconds(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_seconds() - self.total_pause_seconds as i64)
    }
}
