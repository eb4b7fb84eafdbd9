use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure modes of the tracking operations. State conflicts are part
/// of normal operation and carry enough context to render a reply
/// without inspecting timestamps; `Storage` wraps anything the store
/// itself reports.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("user {0} is not registered")]
    NotRegistered(i64),

    #[error("a work session is already open since {started_at}")]
    AlreadyActive { started_at: DateTime<Utc> },

    #[error("no active work session")]
    NoActiveSession,

    #[error("no active pause")]
    NoActivePause,

    #[error("inconsistent data for session {session_id}: {detail}")]
    DataIntegrity { session_id: String, detail: String },

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl TrackerError {
    /// True for rejections caused by the user's current state rather
    /// than by a fault.
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            TrackerError::AlreadyActive { .. }
                | TrackerError::NoActiveSession
                | TrackerError::NoActivePause
        )
    }
}
