use rportal::db::executor::QueryExecutor;
use rportal::db::pool::{DbPool, PoolOptions};
use rportal::errors::AppError;
use rusqlite::params;
use std::panic::{AssertUnwindSafe, catch_unwind};

mod common;
use common::setup_test_db;

fn executor(name: &str, size: usize) -> (tempfile::TempDir, QueryExecutor) {
    let (dir, path) = setup_test_db(name);
    let pool = DbPool::open(&path, PoolOptions::with_size(size)).unwrap();
    let exec = QueryExecutor::new(pool);
    exec.execute(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT UNIQUE NOT NULL, qty INTEGER NOT NULL)",
        [],
    )
    .unwrap();
    (dir, exec)
}

fn count(exec: &QueryExecutor) -> i64 {
    exec.query_scalar("SELECT COUNT(*) FROM items", []).unwrap()
}

#[test]
fn test_execute_reports_inserted_id() {
    let (_dir, exec) = executor("insert_id", 2);

    let first = exec
        .execute("INSERT INTO items (name, qty) VALUES (?1, ?2)", params!["gauze", 10])
        .unwrap();
    let second = exec
        .execute("INSERT INTO items (name, qty) VALUES (?1, ?2)", params!["tape", 3])
        .unwrap();

    assert_eq!(first.rows_affected, 1);
    assert_eq!(first.last_insert_id, Some(1));
    assert_eq!(second.last_insert_id, Some(2));

    let update = exec
        .execute("UPDATE items SET qty = qty + 1 WHERE name = ?1", ["tape"])
        .unwrap();
    assert_eq!(update.rows_affected, 1);
    assert_eq!(update.last_insert_id, None);
}

#[test]
fn test_batch_failure_rolls_back_everything() {
    let (_dir, exec) = executor("batch_rollback", 2);

    let batch = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4)];
    let err = exec
        .execute_many("INSERT INTO items (name, qty) VALUES (?1, ?2)", batch)
        .unwrap_err();

    assert!(matches!(err, AppError::Duplicate(_)));
    assert_eq!(count(&exec), 0);
    assert_eq!(exec.pool().status().available, 2, "connection leaked");
}

#[test]
fn test_batch_success_commits_once() {
    let (_dir, exec) = executor("batch_ok", 1);

    let outcome = exec
        .execute_many(
            "INSERT INTO items (name, qty) VALUES (?1, ?2)",
            [("a", 1), ("b", 2), ("c", 3)],
        )
        .unwrap();

    assert_eq!(outcome.rows_affected, 3);
    assert_eq!(outcome.last_insert_id, Some(3));
    assert_eq!(count(&exec), 3);
}

#[test]
fn test_duplicate_leaves_store_unchanged() {
    let (_dir, exec) = executor("duplicate", 2);
    exec.execute("INSERT INTO items (name, qty) VALUES ('x', 1)", [])
        .unwrap();

    let err = exec
        .execute("INSERT INTO items (name, qty) VALUES ('x', 2)", [])
        .unwrap_err();

    assert!(err.is_duplicate());
    assert_eq!(count(&exec), 1);
    let qty = exec
        .query_scalar("SELECT qty FROM items WHERE name = 'x'", [])
        .unwrap();
    assert_eq!(qty, 1);
}

#[test]
fn test_not_null_is_a_constraint_error() {
    let (_dir, exec) = executor("not_null", 1);
    let err = exec
        .execute("INSERT INTO items (name, qty) VALUES ('x', NULL)", [])
        .unwrap_err();
    assert!(matches!(err, AppError::Constraint(_)));
}

#[test]
fn test_closure_error_rolls_back_transaction() {
    let (_dir, exec) = executor("closure_error", 1);

    let result: Result<(), AppError> = exec.transaction(|tx| {
        tx.execute("INSERT INTO items (name, qty) VALUES ('kept?', 1)", [])?;
        Err(AppError::InvalidInput("abort".into()))
    });

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert_eq!(count(&exec), 0);
    assert_eq!(exec.pool().status().available, 1);
}

#[test]
fn test_panic_inside_transaction_rolls_back_and_releases() {
    let (_dir, exec) = executor("panic_tx", 1);

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _: Result<(), AppError> = exec.transaction(|tx| {
            tx.execute("INSERT INTO items (name, qty) VALUES ('ghost', 1)", [])?;
            panic!("handler bug");
        });
    }));

    assert!(outcome.is_err());
    assert_eq!(exec.pool().status().available, 1);
    assert_eq!(exec.pool().status().in_use, 0);
    // the single connection is usable and the insert is gone
    assert_eq!(count(&exec), 0);
}

#[test]
fn test_read_error_is_distinct_from_no_rows() {
    let (_dir, exec) = executor("read_error", 1);

    let empty: Vec<String> = exec
        .query("SELECT name FROM items WHERE qty > ?1", [100], |r| r.get(0))
        .unwrap();
    assert!(empty.is_empty());

    let broken: Result<Vec<String>, AppError> =
        exec.query("SELECT name FROM no_such_table", [], |r| r.get(0));
    assert!(matches!(broken, Err(AppError::Db(_))));

    assert_eq!(exec.pool().status().available, 1);
}

#[test]
fn test_query_opt_zero_or_one() {
    let (_dir, exec) = executor("query_opt", 1);
    exec.execute("INSERT INTO items (name, qty) VALUES ('one', 1)", [])
        .unwrap();

    let hit: Option<i64> = exec
        .query_opt("SELECT qty FROM items WHERE name = ?1", ["one"], |r| r.get(0))
        .unwrap();
    let miss: Option<i64> = exec
        .query_opt("SELECT qty FROM items WHERE name = ?1", ["two"], |r| r.get(0))
        .unwrap();

    assert_eq!(hit, Some(1));
    assert_eq!(miss, None);
}
