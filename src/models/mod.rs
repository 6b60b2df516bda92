pub mod audit;
pub mod document;
pub mod inventory;
pub mod registration;
pub mod user;

use crate::errors::AppError;
use rusqlite::types::Type;

/// Build the rusqlite error used when a TEXT column holds a value that does
/// not map onto one of our enums.
pub(crate) fn bad_column(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::new(AppError::InvalidInput(format!("invalid {what}: {value}"))),
    )
}
