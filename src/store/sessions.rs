use chrono::{Duration, SecondsFormat, Utc};
use rand::Rng;
use rusqlite::params;

use crate::error::AppResult;
use crate::state::DbPool;
use crate::store::now_rfc3339;

/// Create a new session for a user. Returns the session token that goes
/// into the cookie. A failure here means no cookie must be issued.
pub fn start_session(pool: &DbPool, username: &str, hours: u64) -> AppResult<String> {
    let conn = pool.get()?;

    let token = generate_token();
    let id = uuid::Uuid::now_v7().to_string();
    let expires_at = (Utc::now() + Duration::hours(hours as i64))
        .to_rfc3339_opts(SecondsFormat::Micros, true);

    conn.execute(
        "INSERT INTO sessions (id, username, token, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, username, token, now_rfc3339(), expires_at],
    )?;

    Ok(token)
}

/// Resolve a session token to its username. Absent if the token is unknown
/// or the session has expired. Pure read, no side effects.
pub fn find_username(pool: &DbPool, token: &str) -> AppResult<Option<String>> {
    let conn = pool.get()?;

    let mut stmt =
        conn.prepare("SELECT username FROM sessions WHERE token = ?1 AND expires_at > ?2")?;
    let mut rows = stmt.query_map(params![token, now_rfc3339()], |row| row.get(0))?;

    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Delete a session by token. Idempotent: ending a session that does not
/// exist is a no-op.
pub fn end_session(pool: &DbPool, token: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
