use crate::db::executor::QueryExecutor;
use crate::db::log;
use crate::errors::AppResult;
use crate::models::audit::{AuditEntry, NewAuditEntry};
use rusqlite::Connection;

pub struct AuditLogic;

impl AuditLogic {
    /// Append on the caller's connection, usually the transaction of the
    /// change being recorded.
    pub fn append(conn: &Connection, entry: &NewAuditEntry<'_>) -> AppResult<i64> {
        log::audit(conn, entry)
    }

    /// Latest entries, newest first.
    pub fn recent(exec: &QueryExecutor, limit: usize) -> AppResult<Vec<AuditEntry>> {
        exec.query(
            "SELECT id, actor, action, target_type, target_id, details, created_at
             FROM audit_log
             ORDER BY id DESC
             LIMIT ?1",
            [i64::try_from(limit).unwrap_or(i64::MAX)],
            AuditEntry::from_row,
        )
    }
}
