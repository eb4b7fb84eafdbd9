use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    helpers::{parse_date, parse_datetime, parse_optional_datetime, to_i64, to_u64},
    models::WorkSession,
    Database,
};

const SESSION_COLUMNS: &str =
    "id, user_id, date, start_time, end_time, description, total_pause_seconds, created_at";

fn row_to_session(row: &Row) -> Result<WorkSession> {
    let date: String = row.get("date")?;
    let start_time: String = row.get("start_time")?;
    let end_time: Option<String> = row.get("end_time")?;
    let created_at: String = row.get("created_at")?;
    let total_pause_seconds: i64 = row.get("total_pause_seconds")?;

    Ok(WorkSession {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        date: parse_date(&date, "date")?,
        start_time: parse_datetime(&start_time, "start_time")?,
        end_time: parse_optional_datetime(end_time, "end_time")?,
        description: row.get("description")?,
        total_pause_seconds: to_u64(total_pause_seconds, "total_pause_seconds")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

pub(crate) fn active_session(conn: &Connection, user_id: i64) -> Result<Option<WorkSession>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS}
         FROM work_sessions
         WHERE user_id = ?1 AND end_time IS NULL
         LIMIT 1"
    ))?;

    let mut rows = stmt.query(params![user_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_session(row)?)),
        None => Ok(None),
    }
}

pub(crate) fn insert_session(conn: &Connection, session: &WorkSession) -> Result<()> {
    conn.execute(
        "INSERT INTO work_sessions (id, user_id, date, start_time, end_time, description, total_pause_seconds, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            session.id,
            session.user_id,
            session.date.format("%Y-%m-%d").to_string(),
            session.start_time.to_rfc3339(),
            session.end_time.as_ref().map(|dt| dt.to_rfc3339()),
            session.description,
            to_i64(session.total_pause_seconds)?,
            session.created_at.to_rfc3339(),
        ],
    )
    .with_context(|| "failed to insert work session")?;
    Ok(())
}

pub(crate) fn finish_session(
    conn: &Connection,
    session_id: &str,
    ended_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE work_sessions
         SET end_time = ?1
         WHERE id = ?2",
        params![ended_at.to_rfc3339(), session_id],
    )
    .with_context(|| "failed to finish work session")?;
    Ok(())
}

pub(crate) fn add_pause_seconds(conn: &Connection, session_id: &str, seconds: u64) -> Result<()> {
    conn.execute(
        "UPDATE work_sessions
         SET total_pause_seconds = total_pause_seconds + ?1
         WHERE id = ?2",
        params![to_i64(seconds)?, session_id],
    )
    .with_context(|| "failed to accumulate pause time")?;
    Ok(())
}

impl Database {
    pub async fn insert_session(&self, session: &WorkSession) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| insert_session(conn, &record)).await
    }

    /// Completed sessions recorded under the given calendar date.
    pub async fn completed_sessions_on(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<WorkSession>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS}
                 FROM work_sessions
                 WHERE user_id = ?1 AND date = ?2 AND end_time IS NOT NULL
                 ORDER BY start_time ASC"
            ))?;

            let mut rows = stmt.query(params![user_id, date.format("%Y-%m-%d").to_string()])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }

    /// Completed sessions whose end timestamp falls in `[from, to)`.
    /// RFC 3339 UTC strings compare lexicographically in timestamp
    /// order, so the filter runs directly on the stored text.
    pub async fn completed_sessions_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WorkSession>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS}
                 FROM work_sessions
                 WHERE user_id = ?1
                   AND end_time IS NOT NULL
                   AND end_time >= ?2
                   AND end_time < ?3
                 ORDER BY start_time ASC"
            ))?;

            let mut rows = stmt.query(params![
                user_id,
                from.to_rfc3339(),
                to.to_rfc3339()
            ])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }
}
