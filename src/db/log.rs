use crate::errors::AppResult;
use crate::models::audit::NewAuditEntry;
use crate::utils::time::now_stamp;
use rusqlite::Connection;
use rusqlite::params;

/// Append one entry to the `audit_log` table.
///
/// Takes a plain connection so the entry lands in the caller's transaction.
pub fn audit(conn: &Connection, entry: &NewAuditEntry<'_>) -> AppResult<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO audit_log (actor, action, target_type, target_id, details, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    stmt.execute(params![
        entry.actor,
        entry.action,
        entry.target_type,
        entry.target_id,
        entry.details,
        now_stamp(),
    ])?;

    Ok(conn.last_insert_rowid())
}
