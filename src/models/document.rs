use super::bad_column;
use rusqlite::Row;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "Pending",
            DocumentStatus::Approved => "Approved",
            DocumentStatus::Rejected => "Rejected",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(DocumentStatus::Pending),
            "Approved" => Some(DocumentStatus::Approved),
            "Rejected" => Some(DocumentStatus::Rejected),
            _ => None,
        }
    }

    /// Case-insensitive parse for CLI input.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(DocumentStatus::Pending),
            "approved" => Some(DocumentStatus::Approved),
            "rejected" => Some(DocumentStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub uploader_id: i64,
    pub uploader_name: String,
    pub status: DocumentStatus,
    pub upload_date: String,
    pub last_modified: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub description: Option<String>,
}

impl Document {
    /// Expects the columns of `documents` plus `uploader_name`.
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status_str: String = row.get("status")?;
        let status = DocumentStatus::from_db_str(&status_str)
            .ok_or_else(|| bad_column(3, "document status", &status_str))?;

        Ok(Self {
            id: row.get("id")?,
            filename: row.get("filename")?,
            uploader_id: row.get("uploader_id")?,
            uploader_name: row.get("uploader_name")?,
            status,
            upload_date: row.get("upload_date")?,
            last_modified: row.get("last_modified")?,
            file_type: row.get("file_type")?,
            file_size: row.get("file_size")?,
            description: row.get("description")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub document_id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub comment_text: String,
    pub created_at: String,
}

impl Comment {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            document_id: row.get("document_id")?,
            user_id: row.get("user_id")?,
            full_name: row.get("full_name")?,
            comment_text: row.get("comment_text")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum IdpStatus {
    Success,
    Failed,
}

impl IdpStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            IdpStatus::Success => "Success",
            IdpStatus::Failed => "Failed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Success" => Some(IdpStatus::Success),
            "Failed" => Some(IdpStatus::Failed),
            _ => None,
        }
    }
}

/// Stored outcome of one enrichment attempt.
#[derive(Debug, Clone, Serialize)]
pub struct IdpResult {
    pub id: i64,
    pub document_id: i64,
    pub processed_at: String,
    pub classification: Option<String>,
    pub extracted_data: Value,
    pub confidence_score: f64,
    pub status: IdpStatus,
}

impl IdpResult {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status_str: String = row.get("status")?;
        let status =
            IdpStatus::from_db_str(&status_str).ok_or_else(|| bad_column(6, "idp status", &status_str))?;

        let raw: Option<String> = row.get("extracted_data")?;
        let extracted_data = match raw {
            Some(text) if !text.is_empty() => serde_json::from_str(&text).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
            })?,
            _ => Value::Object(Default::default()),
        };

        Ok(Self {
            id: row.get("id")?,
            document_id: row.get("document_id")?,
            processed_at: row.get("processed_at")?,
            classification: row.get("classification")?,
            extracted_data,
            confidence_score: row.get::<_, Option<f64>>("confidence_score")?.unwrap_or(0.0),
            status,
        })
    }
}

/// Document with everything shown on its detail page.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDetails {
    #[serde(flatten)]
    pub document: Document,
    pub comments: Vec<Comment>,
    pub tags: Vec<String>,
    /// Entities from the latest successful enrichment, `{}` when none.
    pub metadata: Value,
}

/// Counters shown on a user's dashboard.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct UserStats {
    pub total_documents: i64,
    pub uploaded_today: i64,
    pub pending_approval: i64,
}

/// Row of the recent enrichment log.
#[derive(Debug, Clone, Serialize)]
pub struct IdpLogEntry {
    pub doc: String,
    pub status: String,
    pub action: Option<String>,
}
