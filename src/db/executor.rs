//! Statement execution on top of the pool.
//!
//! Every call follows the same shape: acquire → run inside a transaction →
//! commit or roll back → release. The connection goes back to the pool in all
//! cases because release is tied to the guard's `Drop`.

use crate::db::pool::{DbPool, PooledConn};
use crate::errors::{AppError, AppResult};
use rusqlite::{Params, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, warn};

/// Result of a state-changing statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecOutcome {
    pub rows_affected: usize,
    /// Row id of the inserted row, for `INSERT`/`REPLACE` statements that
    /// actually wrote something.
    pub last_insert_id: Option<i64>,
}

/// Entry point used by every domain service. Owns a pool handle.
#[derive(Clone)]
pub struct QueryExecutor {
    pool: DbPool,
}

impl QueryExecutor {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Run one statement with positional parameters and commit it.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> AppResult<ExecOutcome> {
        self.transaction(|tx| {
            let rows_affected = tx.execute(sql, params)?;
            Ok(ExecOutcome {
                rows_affected,
                last_insert_id: inserted_id(tx, sql, rows_affected),
            })
        })
    }

    /// Run the same statement once per parameter set, all in one transaction.
    /// A failure on any element rolls back the whole batch.
    pub fn execute_many<P, I>(&self, sql: &str, batch: I) -> AppResult<ExecOutcome>
    where
        P: Params,
        I: IntoIterator<Item = P>,
    {
        self.transaction(|tx| {
            let mut stmt = tx.prepare(sql)?;
            let mut outcome = ExecOutcome {
                rows_affected: 0,
                last_insert_id: None,
            };

            for params in batch {
                let n = stmt.execute(params)?;
                outcome.rows_affected += n;
                if let Some(id) = inserted_id(tx, sql, n) {
                    outcome.last_insert_id = Some(id);
                }
            }
            Ok(outcome)
        })
    }

    /// Read-only query returning every mapped row.
    ///
    /// `Ok(vec![])` means "no rows"; any failure is an `Err`.
    pub fn query<T, P, F>(&self, sql: &str, params: P, map: F) -> AppResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.pool.acquire()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Zero-or-one row variant of [`QueryExecutor::query`].
    pub fn query_opt<T, P, F>(&self, sql: &str, params: P, map: F) -> AppResult<Option<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut rows = self.query(sql, params, map)?;
        if rows.len() > 1 {
            warn!(rows = rows.len(), "query_opt matched more than one row");
        }
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Single integer column of a single row, e.g. `SELECT COUNT(*) ...`.
    pub fn query_scalar<P: Params>(&self, sql: &str, params: P) -> AppResult<i64> {
        let conn = self.pool.acquire()?;
        let value = conn.query_row(sql, params, |row| row.get::<_, Option<i64>>(0))?;
        Ok(value.unwrap_or(0))
    }

    /// Run `f` inside a transaction on a pooled connection.
    ///
    /// `Ok` commits, `Err` rolls back. A panic inside `f` unwinds through the
    /// transaction guard (rollback on drop) and the connection guard (return
    /// to pool).
    pub fn transaction<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> AppResult<T>,
    {
        let mut conn = self.pool.acquire()?;
        run_in_transaction(&mut conn, f)
    }
}

pub(crate) fn run_in_transaction<T, F>(conn: &mut PooledConn, f: F) -> AppResult<T>
where
    F: FnOnce(&Transaction<'_>) -> AppResult<T>,
{
    let slot = conn.slot();
    // IMMEDIATE takes the write lock up front so concurrent writers queue on
    // the busy timeout instead of failing on lock upgrade
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    match f(&tx) {
        Ok(value) => {
            tx.commit()?;
            debug!(slot, "transaction committed");
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(slot, error = %rollback_err, "rollback failed");
            }
            log_rollback(slot, &e);
            Err(e)
        }
    }
}

fn log_rollback(slot: usize, e: &AppError) {
    match e {
        // expected, recoverable conditions
        AppError::Duplicate(_)
        | AppError::NotFound(_)
        | AppError::InvalidInput(_)
        | AppError::PermissionDenied(_)
        | AppError::InvalidTransition(_) => debug!(slot, error = %e, "transaction rolled back"),
        _ => warn!(slot, error = %e, "transaction rolled back"),
    }
}

fn inserted_id(conn: &rusqlite::Connection, sql: &str, rows_affected: usize) -> Option<i64> {
    if rows_affected == 0 {
        return None;
    }
    let head = sql.trim_start();
    let is_insert = ["INSERT", "REPLACE"].iter().any(|kw| {
        head.get(..kw.len())
            .map(|h| h.eq_ignore_ascii_case(kw))
            .unwrap_or(false)
    });
    is_insert.then(|| conn.last_insert_rowid())
}

/// `%term%` for a `LIKE .. ESCAPE '\\'` clause. Wildcards typed by the user
/// match literally.
pub fn like_contains(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::like_contains;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_contains("ab"), "%ab%");
        assert_eq!(like_contains("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_contains("a\\b"), "%a\\\\b%");
    }
}
