use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    helpers::{parse_datetime, parse_optional_datetime},
    models::Pause,
    Database,
};

const PAUSE_COLUMNS: &str = "id, session_id, start_time, end_time, reason, created_at";

fn row_to_pause(row: &Row) -> Result<Pause> {
    let start_time: String = row.get("start_time")?;
    let end_time: Option<String> = row.get("end_time")?;
    let created_at: String = row.get("created_at")?;

    Ok(Pause {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        start_time: parse_datetime(&start_time, "start_time")?,
        end_time: parse_optional_datetime(end_time, "end_time")?,
        reason: row.get("reason")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

pub(crate) fn active_pause(conn: &Connection, session_id: &str) -> Result<Option<Pause>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAUSE_COLUMNS}
         FROM pauses
         WHERE session_id = ?1 AND end_time IS NULL
         LIMIT 1"
    ))?;

    let mut rows = stmt.query(params![session_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_pause(row)?)),
        None => Ok(None),
    }
}

pub(crate) fn insert_pause(conn: &Connection, pause: &Pause) -> Result<()> {
    conn.execute(
        "INSERT INTO pauses (id, session_id, start_time, end_time, reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            pause.id,
            pause.session_id,
            pause.start_time.to_rfc3339(),
            pause.end_time.as_ref().map(|dt| dt.to_rfc3339()),
            pause.reason,
            pause.created_at.to_rfc3339(),
        ],
    )
    .with_context(|| "failed to insert pause record")?;
    Ok(())
}

pub(crate) fn close_pause(conn: &Connection, pause_id: &str, ended_at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE pauses
         SET end_time = ?1
         WHERE id = ?2",
        params![ended_at.to_rfc3339(), pause_id],
    )
    .with_context(|| "failed to close pause record")?;
    Ok(())
}

impl Database {
    pub async fn session_pauses(&self, session_id: &str) -> Result<Vec<Pause>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAUSE_COLUMNS}
                 FROM pauses
                 WHERE session_id = ?1
                 ORDER BY start_time ASC"
            ))?;

            let mut rows = stmt.query(params![session_id])?;
            let mut pauses = Vec::new();
            while let Some(row) = rows.next()? {
                pauses.push(row_to_pause(row)?);
            }

            Ok(pauses)
        })
        .await
    }
}
