use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use crate::db::{helpers::parse_datetime, models::User, Database};

fn row_to_user(row: &Row) -> Result<User> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(User {
        chat_id: row.get("chat_id")?,
        username: row.get("username")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        is_admin: row.get("is_admin")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

pub(crate) fn find_user(conn: &Connection, chat_id: i64) -> Result<Option<User>> {
    let mut stmt = conn.prepare(
        "SELECT chat_id, username, first_name, last_name, is_admin, created_at, updated_at
         FROM users
         WHERE chat_id = ?1",
    )?;

    let mut rows = stmt.query(params![chat_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_user(row)?)),
        None => Ok(None),
    }
}

pub(crate) fn insert_user(conn: &Connection, user: &User) -> Result<()> {
    conn.execute(
        "INSERT INTO users (chat_id, username, first_name, last_name, is_admin, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.chat_id,
            user.username,
            user.first_name,
            user.last_name,
            user.is_admin,
            user.created_at.to_rfc3339(),
            user.updated_at.to_rfc3339(),
        ],
    )
    .with_context(|| "failed to insert user")?;
    Ok(())
}

pub(crate) fn update_user(conn: &Connection, user: &User) -> Result<()> {
    conn.execute(
        "UPDATE users
         SET username = ?1,
             first_name = ?2,
             last_name = ?3,
             is_admin = ?4,
             updated_at = ?5
         WHERE chat_id = ?6",
        params![
            user.username,
            user.first_name,
            user.last_name,
            user.is_admin,
            user.updated_at.to_rfc3339(),
            user.chat_id,
        ],
    )
    .with_context(|| "failed to update user")?;
    Ok(())
}

impl Database {
    pub async fn get_user(&self, chat_id: i64) -> Result<Option<User>> {
        self.execute(move |conn| find_user(conn, chat_id)).await
    }
}
