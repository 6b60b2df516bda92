use rusqlite::Row;
use serde::Serialize;

/// One row of the append-only `audit_log` table.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub actor: String,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<i64>,
    pub details: Option<String>,
    pub created_at: String,
}

impl AuditEntry {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            actor: row.get("actor")?,
            action: row.get("action")?,
            target_type: row.get("target_type")?,
            target_id: row.get("target_id")?,
            details: row.get("details")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// What a state-changing operation records about itself.
#[derive(Debug, Clone)]
pub struct NewAuditEntry<'a> {
    pub actor: &'a str,
    pub action: &'a str,
    pub target_type: &'a str,
    pub target_id: Option<i64>,
    pub details: Option<String>,
}

impl<'a> NewAuditEntry<'a> {
    pub fn new(actor: &'a str, action: &'a str, target_type: &'a str) -> Self {
        Self {
            actor,
            action,
            target_type,
            target_id: None,
            details: None,
        }
    }

    pub fn target(mut self, id: i64) -> Self {
        self.target_id = Some(id);
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
