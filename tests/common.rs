#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rportal::db::executor::QueryExecutor;
use rportal::db::open_database;
use rportal::db::pool::PoolOptions;
use rportal::db::schema::SchemaSet;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn rp() -> Command {
    cargo_bin_cmd!("rportal")
}

/// Fresh database path inside its own temp dir. Keep the `TempDir` alive for
/// as long as the database is used.
pub fn setup_test_db(name: &str) -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path: PathBuf = dir.path().join(format!("{name}_rportal.sqlite"));
    (dir, path.to_string_lossy().to_string())
}

/// Open a fully initialized database (every application) with `size`
/// pooled connections.
pub fn open_exec(name: &str, size: usize) -> (TempDir, QueryExecutor) {
    let (dir, path) = setup_test_db(name);
    let (exec, _) =
        open_database(&path, PoolOptions::with_size(size), &SchemaSet::ALL).expect("open database");
    (dir, exec)
}

/// `--db <path> --test init`, asserting success.
pub fn init_db(db_path: &str) {
    rp().args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Write a small file next to the database and return its path.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write test file");
    path.to_string_lossy().to_string()
}
