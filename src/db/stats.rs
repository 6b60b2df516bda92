use crate::db::executor::QueryExecutor;
use crate::db::pool::PoolStatus;
use crate::db::schema::{SchemaSet, table_exists};
use crate::errors::AppResult;
use serde::Serialize;
use std::fs;

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DbInfo {
    pub path: String,
    pub file_size: u64,
    pub pool: PoolStatus,
    pub tables: Vec<TableCount>,
}

/// File size, pool counters and row counts of every known table that exists.
pub fn db_info(exec: &QueryExecutor) -> AppResult<DbInfo> {
    let path = exec.pool().path().to_path_buf();
    let file_size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    let mut names: Vec<&'static str> = vec!["audit_log"];
    for set in SchemaSet::ALL {
        names.extend_from_slice(set.tables());
    }

    let conn = exec.pool().acquire()?;
    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        if !table_exists(&conn, name)? {
            continue;
        }
        tables.push(TableCount {
            table: name.to_string(),
            rows: count_rows(&conn, name)?,
        });
    }
    drop(conn);

    Ok(DbInfo {
        path: path.to_string_lossy().to_string(),
        file_size,
        pool: exec.pool().status(),
        tables,
    })
}

/// `SELECT COUNT(*)` for one of the fixed table names.
///
/// Table names cannot be bound as parameters, so the statement is picked
/// from a closed list instead of being built from input.
fn count_rows(conn: &rusqlite::Connection, table: &str) -> AppResult<i64> {
    let sql = match table {
        "audit_log" => "SELECT COUNT(*) FROM audit_log",
        "users" => "SELECT COUNT(*) FROM users",
        "documents" => "SELECT COUNT(*) FROM documents",
        "document_tags" => "SELECT COUNT(*) FROM document_tags",
        "comments" => "SELECT COUNT(*) FROM comments",
        "idp_results" => "SELECT COUNT(*) FROM idp_results",
        "equipment" => "SELECT COUNT(*) FROM equipment",
        "medicines" => "SELECT COUNT(*) FROM medicines",
        "surgical_supplies" => "SELECT COUNT(*) FROM surgical_supplies",
        "faculty" => "SELECT COUNT(*) FROM faculty",
        "events" => "SELECT COUNT(*) FROM events",
        "event_registrations" => "SELECT COUNT(*) FROM event_registrations",
        "team_members" => "SELECT COUNT(*) FROM team_members",
        _ => return Ok(0),
    };
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

/// `PRAGMA integrity_check`; `Ok(None)` when the database is healthy.
pub fn integrity_check(exec: &QueryExecutor) -> AppResult<Option<String>> {
    let conn = exec.pool().acquire()?;
    let result: String = conn.query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;
    Ok(if result == "ok" { None } else { Some(result) })
}

pub fn vacuum(exec: &QueryExecutor) -> AppResult<()> {
    let conn = exec.pool().acquire()?;
    conn.execute_batch("VACUUM;")?;
    Ok(())
}
