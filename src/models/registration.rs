use super::bad_column;
use rusqlite::Row;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationType {
    Individual,
    Team,
}

impl RegistrationType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RegistrationType::Individual => "individual",
            RegistrationType::Team => "team",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(RegistrationType::Individual),
            "team" => Some(RegistrationType::Team),
            _ => None,
        }
    }

    /// Prefix of the generated registration code.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            RegistrationType::Individual => "PID",
            RegistrationType::Team => "TID",
        }
    }
}

/// Registration joined with its event name. The national ID is only ever
/// available as its digest.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub event_name: String,
    pub registration_type: RegistrationType,
    pub registration_code: String,
    pub primary_registrant_name: String,
    pub national_id_hash: String,
    pub registration_date: String,
    pub members: Vec<String>,
}

impl Registration {
    /// `members` is filled in by the caller.
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let kind_str: String = row.get("registration_type")?;
        let registration_type = RegistrationType::from_db_str(&kind_str)
            .ok_or_else(|| bad_column(3, "registration type", &kind_str))?;

        Ok(Self {
            id: row.get("id")?,
            event_id: row.get("event_id")?,
            event_name: row.get("event_name")?,
            registration_type,
            registration_code: row.get("registration_code")?,
            primary_registrant_name: row.get("primary_registrant_name")?,
            national_id_hash: row.get("national_id_hash")?,
            registration_date: row.get("registration_date")?,
            members: Vec::new(),
        })
    }
}

/// An event open for registration.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub event_date: Option<String>,
    pub registrations: i64,
}

impl Event {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            category: row.get("category")?,
            event_date: row.get("event_date")?,
            registrations: row.get("registrations")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Faculty {
    pub id: i64,
    pub name: String,
    pub qualification: Option<String>,
    pub department: Option<String>,
    pub subjects: Option<String>,
    pub email: Option<String>,
}

impl Faculty {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            qualification: row.get("qualification")?,
            department: row.get("department")?,
            subjects: row.get("subjects")?,
            email: row.get("email")?,
        })
    }
}
