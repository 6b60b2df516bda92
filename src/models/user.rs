use super::bad_column;
use rusqlite::Row;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Manager,
}

impl Role {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Manager => "manager",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "manager" => Some(Role::Manager),
            _ => None,
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Manager)
    }
}

/// Portal account. The stored password hash never leaves the db layer.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip)]
    pub password_hash: String,
}

impl User {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let role_str: String = row.get("role")?;
        let role = Role::from_db_str(&role_str).ok_or_else(|| bad_column(4, "role", &role_str))?;

        Ok(Self {
            id: row.get("id")?,
            full_name: row.get("full_name")?,
            email: row.get("email")?,
            role,
            password_hash: row.get("password")?,
        })
    }
}
