use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use log::{debug, info};
use rusqlite::Transaction;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{
        models::{Pause, User, WorkSession},
        repositories::{pauses, sessions, users},
        Database,
    },
    error::TrackerError,
    stats::{self, DailyStats, WeeklyStats},
};

use super::TrackerStatus;

/// Outcome of a pause toggle: either a fresh pause was opened or the
/// open one was closed and accounted into the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PauseToggle {
    Opened(Pause),
    Closed { pause: Pause, session: WorkSession },
}

/// Read snapshot of the open pause, elapsed as of the query instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePause {
    pub pause: Pause,
    pub session: WorkSession,
    pub elapsed_seconds: u64,
}

/// The session/pause state machine. Every mutating operation captures
/// `Utc::now()` once on entry and runs check + mutation as a single
/// transaction on the database worker, so a rejected operation writes
/// nothing and concurrent operations on one user cannot interleave.
#[derive(Clone)]
pub struct Tracker {
    db: Database,
}

impl Tracker {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create the user on first contact; refresh changed metadata on
    /// later contacts.
    pub async fn register_or_update_user(
        &self,
        chat_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        is_admin: bool,
    ) -> Result<User, TrackerError> {
        let now = Utc::now();
        let user = self
            .db
            .execute(move |conn| {
                let tx = conn.transaction()?;
                let user = match users::find_user(&tx, chat_id)? {
                    None => {
                        let user = User {
                            chat_id,
                            username,
                            first_name,
                            last_name,
                            is_admin,
                            created_at: now,
                            updated_at: now,
                        };
                        users::insert_user(&tx, &user)?;
                        info!("Registered new user {chat_id}");
                        user
                    }
                    Some(mut user) => {
                        let mut changed = false;
                        if username.is_some() && user.username != username {
                            user.username = username;
                            changed = true;
                        }
                        if first_name.is_some() && user.first_name != first_name {
                            user.first_name = first_name;
                            changed = true;
                        }
                        if last_name.is_some() && user.last_name != last_name {
                            user.last_name = last_name;
                            changed = true;
                        }
                        if user.is_admin != is_admin {
                            user.is_admin = is_admin;
                            changed = true;
                        }
                        if changed {
                            user.updated_at = now;
                            users::update_user(&tx, &user)?;
                        }
                        user
                    }
                };
                tx.commit()?;
                Ok(user)
            })
            .await?;

        Ok(user)
    }

    /// Open a work session. Refused with `AlreadyActive` while one is
    /// open; the refusal performs no writes.
    pub async fn start_work_day(
        &self,
        user_id: i64,
        description: Option<String>,
    ) -> Result<WorkSession, TrackerError> {
        let now = Utc::now();
        let result = self
            .db
            .execute(move |conn| {
                let tx = conn.transaction()?;
                if users::find_user(&tx, user_id)?.is_none() {
                    return Ok(Err(TrackerError::NotRegistered(user_id)));
                }
                if let Some(open) = sessions::active_session(&tx, user_id)? {
                    return Ok(Err(TrackerError::AlreadyActive {
                        started_at: open.start_time,
                    }));
                }

                let session = WorkSession {
                    id: Uuid::new_v4().to_string(),
                    user_id,
                    date: now.date_naive(),
                    start_time: now,
                    end_time: None,
                    description,
                    total_pause_seconds: 0,
                    created_at: now,
                };
                sessions::insert_session(&tx, &session)?;
                tx.commit()?;
                Ok(Ok(session))
            })
            .await?;

        if let Ok(session) = &result {
            info!("User {user_id} started work session {}", session.id);
        }
        result
    }

    /// Close the open work session. A stop while paused closes the
    /// trailing pause first, so its time is accounted for before the
    /// session is finalized.
    pub async fn stop_work_day(&self, user_id: i64) -> Result<WorkSession, TrackerError> {
        let now = Utc::now();
        let result = self
            .db
            .execute(move |conn| {
                let tx = conn.transaction()?;
                if users::find_user(&tx, user_id)?.is_none() {
                    return Ok(Err(TrackerError::NotRegistered(user_id)));
                }
                let Some(mut session) = sessions::active_session(&tx, user_id)? else {
                    return Ok(Err(TrackerError::NoActiveSession));
                };

                if let Some(open) = pauses::active_pause(&tx, &session.id)? {
                    let (_, updated) = close_pause_in_tx(&tx, &session, &open, now)?;
                    session = updated;
                }

                sessions::finish_session(&tx, &session.id, now)?;
                session.end_time = Some(now);
                tx.commit()?;
                Ok(Ok(session))
            })
            .await?;

        if let Ok(session) = &result {
            info!("User {user_id} stopped work session {}", session.id);
        }
        result
    }

    /// Open a pause when working, close the open one when paused.
    pub async fn toggle_pause(
        &self,
        user_id: i64,
        reason: Option<String>,
    ) -> Result<PauseToggle, TrackerError> {
        let now = Utc::now();
        let result = self
            .db
            .execute(move |conn| {
                let tx = conn.transaction()?;
                if users::find_user(&tx, user_id)?.is_none() {
                    return Ok(Err(TrackerError::NotRegistered(user_id)));
                }
                let Some(session) = sessions::active_session(&tx, user_id)? else {
                    return Ok(Err(TrackerError::NoActiveSession));
                };

                let outcome = match pauses::active_pause(&tx, &session.id)? {
                    Some(open) => {
                        let (pause, session) = close_pause_in_tx(&tx, &session, &open, now)?;
                        PauseToggle::Closed { pause, session }
                    }
                    None => {
                        let pause = Pause {
                            id: Uuid::new_v4().to_string(),
                            session_id: session.id.clone(),
                            start_time: now,
                            end_time: None,
                            reason,
                            created_at: now,
                        };
                        pauses::insert_pause(&tx, &pause)?;
                        PauseToggle::Opened(pause)
                    }
                };
                tx.commit()?;
                Ok(Ok(outcome))
            })
            .await?;

        match &result {
            Ok(PauseToggle::Opened(pause)) => {
                debug!("User {user_id} opened pause {}", pause.id);
            }
            Ok(PauseToggle::Closed { pause, .. }) => {
                debug!("User {user_id} closed pause {}", pause.id);
            }
            Err(_) => {}
        }
        result
    }

    /// Explicitly close the open pause. Unlike `toggle_pause` this
    /// never opens one; when nothing is open it reports
    /// `NoActivePause`.
    pub async fn end_pause(&self, user_id: i64) -> Result<PauseToggle, TrackerError> {
        let now = Utc::now();
        self.db
            .execute(move |conn| {
                let tx = conn.transaction()?;
                if users::find_user(&tx, user_id)?.is_none() {
                    return Ok(Err(TrackerError::NotRegistered(user_id)));
                }
                let Some(session) = sessions::active_session(&tx, user_id)? else {
                    return Ok(Err(TrackerError::NoActiveSession));
                };
                let Some(open) = pauses::active_pause(&tx, &session.id)? else {
                    return Ok(Err(TrackerError::NoActivePause));
                };

                let (pause, session) = close_pause_in_tx(&tx, &session, &open, now)?;
                tx.commit()?;
                Ok(Ok(PauseToggle::Closed { pause, session }))
            })
            .await?
    }

    /// Read-only: the open pause with elapsed time as of now, or `None`
    /// when no pause is open. Repeated calls differ only in elapsed
    /// time.
    pub async fn active_pause(&self, user_id: i64) -> Result<Option<ActivePause>, TrackerError> {
        let now = Utc::now();
        self.db
            .execute(move |conn| {
                if users::find_user(conn, user_id)?.is_none() {
                    return Ok(Err(TrackerError::NotRegistered(user_id)));
                }
                let Some(session) = sessions::active_session(conn, user_id)? else {
                    return Ok(Ok(None));
                };
                let Some(pause) = pauses::active_pause(conn, &session.id)? else {
                    return Ok(Ok(None));
                };

                let elapsed_seconds = (now - pause.start_time).num_seconds().max(0) as u64;
                Ok(Ok(Some(ActivePause {
                    pause,
                    session,
                    elapsed_seconds,
                })))
            })
            .await?
    }

    /// Read-only: derive `Idle`/`Working`/`Paused` from the store.
    pub async fn status(&self, user_id: i64) -> Result<TrackerStatus, TrackerError> {
        self.db
            .execute(move |conn| {
                if users::find_user(conn, user_id)?.is_none() {
                    return Ok(Err(TrackerError::NotRegistered(user_id)));
                }
                let Some(session) = sessions::active_session(conn, user_id)? else {
                    return Ok(Ok(TrackerStatus::Idle));
                };
                let status = if pauses::active_pause(conn, &session.id)?.is_some() {
                    TrackerStatus::Paused
                } else {
                    TrackerStatus::Working
                };
                Ok(Ok(status))
            })
            .await?
    }

    pub async fn session_pauses(&self, session_id: &str) -> Result<Vec<Pause>, TrackerError> {
        Ok(self.db.session_pauses(session_id).await?)
    }

    /// Aggregate over the user's completed sessions recorded under
    /// `date`.
    pub async fn daily_stats(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<DailyStats, TrackerError> {
        self.require_user(user_id).await?;
        let sessions = self.db.completed_sessions_on(user_id, date).await?;
        stats::daily_stats(&sessions)
    }

    /// Aggregate over sessions completed in the 7 calendar days ending
    /// at `from` (inclusive), broken down by the session date.
    pub async fn weekly_stats(
        &self,
        user_id: i64,
        from: NaiveDate,
    ) -> Result<WeeklyStats, TrackerError> {
        self.require_user(user_id).await?;
        let window_start = (from - Duration::days(6)).and_time(NaiveTime::MIN).and_utc();
        let window_end = (from + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();
        let sessions = self
            .db
            .completed_sessions_between(user_id, window_start, window_end)
            .await?;
        stats::weekly_stats(&sessions)
    }

    async fn require_user(&self, user_id: i64) -> Result<User, TrackerError> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or(TrackerError::NotRegistered(user_id))
    }
}

/// Close `pause` at `now` and fold its duration into the session
/// accumulator, inside the caller's transaction. Returns the updated
/// records.
fn close_pause_in_tx(
    tx: &Transaction<'_>,
    session: &WorkSession,
    pause: &Pause,
    now: DateTime<Utc>,
) -> Result<(Pause, WorkSession)> {
    let seconds = (now - pause.start_time).num_seconds().max(0) as u64;
    pauses::close_pause(tx, &pause.id, now)?;
    sessions::add_pause_seconds(tx, &session.id, seconds)?;

    let mut pause = pause.clone();
    pause.end_time = Some(now);
    let mut session = session.clone();
    session.total_pause_seconds += seconds;
    Ok((pause, session))
}
