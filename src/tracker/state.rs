use serde::{Deserialize, Serialize};

/// Mutually exclusive tracking states per user, derived from the store
/// on every query so a process restart cannot lose or alter them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TrackerStatus {
    /// No open session.
    Idle,
    /// Open session, no open pause.
    Working,
    /// Open session with an open pause.
    Paused,
}
