use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bounded interval within a work session during which work is
/// suspended. `end_time == None` means the pause is still open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pause {
    pub id: String,
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Pause {
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn duration_seconds(&self) -> Option<u64> {
        self.end_time
            .map(|end| (end - self.start_time).num_seconds().max(0) as u64)
    }
}
