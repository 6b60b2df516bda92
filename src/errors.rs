//! Unified application error type.
//! Every layer (pool, executor, core services, cli) returns AppError so the
//! CLI can report a category-specific message and exit cleanly.

use rusqlite::ErrorCode;
use rusqlite::ffi;
use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[source] rusqlite::Error),

    #[error("Already exists: {0}")]
    Duplicate(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    // ---------------------------
    // Pool
    // ---------------------------
    #[error("Timed out after {0:?} waiting for a database connection")]
    PoolTimeout(Duration),

    #[error("Connection pool is closed")]
    PoolClosed,

    #[error("Connection was not checked out from this pool")]
    ForeignConnection,

    // ---------------------------
    // Domain errors
    // ---------------------------
    #[error("{0} not found")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    // ---------------------------
    // Parsing / validation errors
    // ---------------------------
    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("{0} must be a number")]
    InvalidNumber(String),

    #[error("Invalid date format: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ---------------------------
    // Config / serialization
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Classifies SQLite failures so a unique-key clash surfaces as `Duplicate`
/// instead of a generic database error.
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        let detail = match &e {
            rusqlite::Error::SqliteFailure(err, msg) if err.code == ErrorCode::ConstraintViolation => {
                Some((err.extended_code, msg.clone().unwrap_or_else(|| e.to_string())))
            }
            _ => None,
        };

        match detail {
            Some((ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY, msg)) => {
                AppError::Duplicate(msg)
            }
            Some((_, msg)) => AppError::Constraint(msg),
            None => AppError::Db(e),
        }
    }
}

impl AppError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, AppError::Duplicate(_))
    }
}
