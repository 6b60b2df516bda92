//! Table definitions, grouped by application variant.
//!
//! Every statement is `IF NOT EXISTS`, so running any of these against an
//! already initialized database is a no-op.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Group of tables belonging to one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSet {
    Portal,
    Inventory,
    Registrations,
}

impl SchemaSet {
    pub const ALL: [SchemaSet; 3] = [
        SchemaSet::Portal,
        SchemaSet::Inventory,
        SchemaSet::Registrations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SchemaSet::Portal => "portal",
            SchemaSet::Inventory => "inventory",
            SchemaSet::Registrations => "registrations",
        }
    }

    /// Tables created for this set, in creation order.
    pub fn tables(&self) -> &'static [&'static str] {
        match self {
            SchemaSet::Portal => &[
                "users",
                "documents",
                "document_tags",
                "comments",
                "idp_results",
            ],
            SchemaSet::Inventory => &["equipment", "medicines", "surgical_supplies"],
            SchemaSet::Registrations => &["faculty", "events", "event_registrations", "team_members"],
        }
    }

    fn ddl(&self) -> &'static str {
        match self {
            SchemaSet::Portal => PORTAL_DDL,
            SchemaSet::Inventory => INVENTORY_DDL,
            SchemaSet::Registrations => REGISTRATIONS_DDL,
        }
    }
}

impl fmt::Display for SchemaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared by every set: the append-only activity trail.
const AUDIT_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS audit_log (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        actor       TEXT NOT NULL,
        action      TEXT NOT NULL,
        target_type TEXT NOT NULL,
        target_id   INTEGER,
        details     TEXT,
        created_at  TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_audit_created ON audit_log(created_at);

    CREATE TRIGGER IF NOT EXISTS audit_log_no_update
    BEFORE UPDATE ON audit_log
    BEGIN
        SELECT RAISE(ABORT, 'audit_log is append-only');
    END;

    CREATE TRIGGER IF NOT EXISTS audit_log_no_delete
    BEFORE DELETE ON audit_log
    BEGIN
        SELECT RAISE(ABORT, 'audit_log is append-only');
    END;
"#;

const PORTAL_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name  TEXT NOT NULL,
        email      TEXT UNIQUE NOT NULL,
        password   TEXT NOT NULL,
        role       TEXT NOT NULL DEFAULT 'user' CHECK(role IN ('user','manager'))
    );

    CREATE TABLE IF NOT EXISTS documents (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        filename      TEXT NOT NULL,
        uploader_id   INTEGER NOT NULL REFERENCES users(id),
        status        TEXT NOT NULL DEFAULT 'Pending'
                      CHECK(status IN ('Pending','Approved','Rejected')),
        upload_date   TEXT NOT NULL,
        last_modified TEXT NOT NULL,
        file_type     TEXT,
        file_size     INTEGER,
        description   TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_documents_uploader ON documents(uploader_id);
    CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status);

    CREATE TABLE IF NOT EXISTS document_tags (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        document_id INTEGER NOT NULL REFERENCES documents(id),
        tag_name    TEXT NOT NULL,
        UNIQUE(document_id, tag_name)
    );

    CREATE TABLE IF NOT EXISTS comments (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        document_id  INTEGER NOT NULL REFERENCES documents(id),
        user_id      INTEGER NOT NULL REFERENCES users(id),
        comment_text TEXT NOT NULL,
        created_at   TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS idp_results (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        document_id      INTEGER NOT NULL REFERENCES documents(id),
        processed_at     TEXT NOT NULL,
        classification   TEXT,
        extracted_data   TEXT,
        confidence_score REAL,
        status           TEXT NOT NULL CHECK(status IN ('Success','Failed'))
    );
"#;

const INVENTORY_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS equipment (
        equipment_id     INTEGER PRIMARY KEY,
        name             TEXT NOT NULL,
        manufacturer     TEXT NOT NULL,
        cost             REAL NOT NULL,
        location         TEXT NOT NULL DEFAULT 'Unknown',
        last_maintenance TEXT NOT NULL,
        next_maintenance TEXT NOT NULL,
        status           TEXT NOT NULL DEFAULT 'Operational',
        date_added       TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS medicines (
        medicine_id  INTEGER PRIMARY KEY,
        name         TEXT NOT NULL,
        manufacturer TEXT NOT NULL,
        quantity     INTEGER NOT NULL,
        cost         REAL NOT NULL,
        expiry_date  TEXT NOT NULL,
        date_added   TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS surgical_supplies (
        supply_id        INTEGER PRIMARY KEY,
        name             TEXT NOT NULL,
        manufacturer     TEXT NOT NULL,
        cost             REAL NOT NULL,
        last_maintenance TEXT NOT NULL,
        next_maintenance TEXT NOT NULL,
        quantity         INTEGER NOT NULL,
        supply_type      TEXT NOT NULL,
        date_added       TEXT NOT NULL
    );
"#;

const REGISTRATIONS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS faculty (
        id            INTEGER PRIMARY KEY,
        name          TEXT NOT NULL,
        qualification TEXT,
        department    TEXT,
        subjects      TEXT,
        email         TEXT
    );

    CREATE TABLE IF NOT EXISTS events (
        id         INTEGER PRIMARY KEY,
        name       TEXT NOT NULL,
        category   TEXT NOT NULL,
        event_date TEXT
    );

    CREATE TABLE IF NOT EXISTS event_registrations (
        id                      INTEGER PRIMARY KEY,
        event_id                INTEGER NOT NULL REFERENCES events(id),
        registration_type       TEXT NOT NULL CHECK(registration_type IN ('individual','team')),
        registration_code       TEXT UNIQUE NOT NULL,
        primary_registrant_name TEXT NOT NULL,
        national_id_hash        TEXT NOT NULL,
        registration_date       TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS team_members (
        id              INTEGER PRIMARY KEY,
        registration_id INTEGER NOT NULL REFERENCES event_registrations(id),
        member_name     TEXT NOT NULL
    );
"#;

/// Create the shared audit table.
pub fn ensure_audit_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(AUDIT_DDL)
}

/// Create every table of `set`.
pub fn ensure_tables(conn: &Connection, set: SchemaSet) -> rusqlite::Result<()> {
    conn.execute_batch(set.ddl())
}

/// Check if a table exists.
pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
