use rportal::db::executor::QueryExecutor;
use rportal::db::initialize::init_db;
use rportal::db::open_database;
use rportal::db::pool::{DbPool, PoolOptions};
use rportal::db::schema::SchemaSet;
use rportal::errors::AppError;
use std::thread;

mod common;
use common::{open_exec, setup_test_db};

fn rows(exec: &QueryExecutor, table: &str) -> i64 {
    exec.query_scalar(&format!("SELECT COUNT(*) FROM {table}"), [])
        .unwrap()
}

fn table_names(exec: &QueryExecutor) -> Vec<String> {
    exec.query(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        [],
        |r| r.get(0),
    )
    .unwrap()
}

const SEEDED: [(&str, i64); 8] = [
    ("users", 1),
    ("equipment", 1),
    ("medicines", 1),
    ("surgical_supplies", 1),
    ("faculty", 2),
    ("events", 2),
    ("event_registrations", 2),
    ("team_members", 3),
];

#[test]
fn test_init_creates_every_table_and_seed_rows() {
    let (_dir, exec) = open_exec("fresh", 2);

    let names = table_names(&exec);
    for set in SchemaSet::ALL {
        for table in set.tables() {
            assert!(names.iter().any(|n| n == table), "missing table {table}");
        }
    }
    assert!(names.iter().any(|n| n == "audit_log"));

    for (table, expected) in SEEDED {
        assert_eq!(rows(&exec, table), expected, "seed rows in {table}");
    }
    // one audit entry per seeded set
    assert_eq!(rows(&exec, "audit_log"), 3);
}

#[test]
fn test_second_init_is_a_no_op() {
    let (_dir, path) = setup_test_db("twice");

    let (first, report) =
        open_database(&path, PoolOptions::with_size(2), &SchemaSet::ALL).unwrap();
    assert_eq!(report.seeded.len(), 3);
    let tables_before = table_names(&first);
    first.pool().close();

    let (second, report) =
        open_database(&path, PoolOptions::with_size(2), &SchemaSet::ALL).unwrap();
    assert!(report.seeded.is_empty());
    assert_eq!(report.seed_rows, 0);
    assert_eq!(table_names(&second), tables_before);

    for (table, expected) in SEEDED {
        assert_eq!(rows(&second, table), expected, "rows in {table} after re-init");
    }
}

#[test]
fn test_concurrent_init_seeds_once() {
    let (_dir, path) = setup_test_db("concurrent");
    let pool = DbPool::open(&path, PoolOptions::with_size(4)).unwrap();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let pool = pool.clone();
            thread::spawn(move || init_db(&pool, &SchemaSet::ALL))
        })
        .collect();

    let mut seeded_passes = 0;
    for h in handles {
        let report = h.join().unwrap().expect("init succeeds");
        if !report.seeded.is_empty() {
            seeded_passes += 1;
        }
    }
    assert_eq!(seeded_passes, 1);

    let exec = QueryExecutor::new(pool);
    for (table, expected) in SEEDED {
        assert_eq!(rows(&exec, table), expected, "rows in {table}");
    }
    assert_eq!(exec.pool().status().available, 4);
}

#[test]
fn test_only_requested_sets_are_created() {
    let (_dir, path) = setup_test_db("inventory_only");
    let (exec, report) =
        open_database(&path, PoolOptions::with_size(1), &[SchemaSet::Inventory]).unwrap();

    assert_eq!(report.sets, vec![SchemaSet::Inventory]);
    let names = table_names(&exec);
    assert!(names.iter().any(|n| n == "medicines"));
    assert!(!names.iter().any(|n| n == "users"));
    assert!(!names.iter().any(|n| n == "events"));
}

#[test]
fn test_adding_a_set_later_seeds_only_that_set() {
    let (_dir, path) = setup_test_db("add_later");
    let (exec, _) = open_database(&path, PoolOptions::with_size(1), &[SchemaSet::Portal]).unwrap();
    exec.pool().close();

    let (exec, report) = open_database(
        &path,
        PoolOptions::with_size(1),
        &[SchemaSet::Portal, SchemaSet::Registrations],
    )
    .unwrap();

    assert_eq!(report.seeded, vec![SchemaSet::Registrations]);
    assert_eq!(rows(&exec, "users"), 1);
    assert_eq!(rows(&exec, "events"), 2);
}

#[test]
fn test_audit_log_is_append_only() {
    let (_dir, exec) = open_exec("append_only", 1);
    let before = rows(&exec, "audit_log");

    let update = exec.execute("UPDATE audit_log SET actor = 'mallory'", []);
    assert!(matches!(update, Err(AppError::Constraint(_))));

    let delete = exec.execute("DELETE FROM audit_log", []);
    assert!(matches!(delete, Err(AppError::Constraint(_))));

    assert_eq!(rows(&exec, "audit_log"), before);
    let tampered = exec
        .query_scalar("SELECT COUNT(*) FROM audit_log WHERE actor = 'mallory'", [])
        .unwrap();
    assert_eq!(tampered, 0);
}

#[test]
fn test_seeded_registrations_store_only_digests() {
    let (_dir, exec) = open_exec("seed_digest", 1);

    let leaked = exec
        .query_scalar(
            "SELECT COUNT(*) FROM event_registrations
             WHERE national_id_hash IN ('123456789012', '987654321098')",
            [],
        )
        .unwrap();
    assert_eq!(leaked, 0);

    let codes: Vec<String> = exec
        .query(
            "SELECT registration_code FROM event_registrations ORDER BY id",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert!(codes[0].starts_with("PID-"));
    assert!(codes[1].starts_with("TID-"));
}
