//! Aggregation over stored sessions. All figures derive from completed
//! sessions; an in-progress session has no finalized stats and is
//! skipped, never guessed at.

mod types;

pub use types::{DailyStats, DayBreakdown, SessionStats, WeeklyStats};

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{db::models::WorkSession, error::TrackerError};

/// Integer productivity percentage via truncating division; the same
/// convention applies at every aggregate level.
fn productivity(work_seconds: u64, pause_seconds: u64) -> u8 {
    let total = work_seconds + pause_seconds;
    if total == 0 {
        0
    } else {
        ((work_seconds * 100) / total) as u8
    }
}

/// Stats for one session, or `None` while it is still open. A negative
/// net work duration is reported as a data-integrity fault rather than
/// clamped into a plausible-looking figure.
pub fn session_stats(session: &WorkSession) -> Result<Option<SessionStats>, TrackerError> {
    let (ended_at, work) = match (session.end_time, session.work_seconds()) {
        (Some(end), Some(work)) => (end, work),
        _ => return Ok(None),
    };

    if work < 0 {
        return Err(TrackerError::DataIntegrity {
            session_id: session.id.clone(),
            detail: format!("negative work duration ({work}s)"),
        });
    }

    let work = work as u64;
    Ok(Some(SessionStats {
        date: session.date,
        started_at: session.start_time,
        ended_at,
        work_seconds: work,
        pause_seconds: session.total_pause_seconds,
        productivity: productivity(work, session.total_pause_seconds),
        description: session.description.clone(),
    }))
}

/// Summed stats over one day's sessions. Zero completed sessions yield
/// the all-zero aggregate.
pub fn daily_stats(sessions: &[WorkSession]) -> Result<DailyStats, TrackerError> {
    daily_from_iter(sessions.iter())
}

fn daily_from_iter<'a>(
    sessions: impl IntoIterator<Item = &'a WorkSession>,
) -> Result<DailyStats, TrackerError> {
    let mut totals = DailyStats::default();
    for session in sessions {
        let Some(stats) = session_stats(session)? else {
            continue;
        };
        totals.total_work_seconds += stats.work_seconds;
        totals.total_pause_seconds += stats.pause_seconds;
        totals.sessions_count += 1;
    }
    totals.productivity = productivity(totals.total_work_seconds, totals.total_pause_seconds);
    Ok(totals)
}

/// Group sessions by their calendar date, aggregate each day, then sum
/// across days. The week's productivity is recomputed from the summed
/// seconds, not averaged across daily percentages.
pub fn weekly_stats(sessions: &[WorkSession]) -> Result<WeeklyStats, TrackerError> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&WorkSession>> = BTreeMap::new();
    for session in sessions {
        by_day.entry(session.date).or_default().push(session);
    }

    let mut days = Vec::with_capacity(by_day.len());
    let mut totals = DailyStats::default();
    for (date, day_sessions) in by_day {
        let stats = daily_from_iter(day_sessions.iter().copied())?;
        totals.total_work_seconds += stats.total_work_seconds;
        totals.total_pause_seconds += stats.total_pause_seconds;
        totals.sessions_count += stats.sessions_count;
        days.push(DayBreakdown { date, stats });
    }
    totals.productivity = productivity(totals.total_work_seconds, totals.total_pause_seconds);

    Ok(WeeklyStats { days, totals })
}
