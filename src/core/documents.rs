use crate::core::audit::AuditLogic;
use crate::core::enrich::{EnrichOutcome, Enricher};
use crate::db::executor::{QueryExecutor, like_contains};
use crate::errors::{AppError, AppResult};
use crate::models::audit::NewAuditEntry;
use crate::models::document::{
    Comment, Document, DocumentDetails, DocumentStatus, IdpLogEntry, IdpResult, IdpStatus, UserStats,
};
use crate::models::user::User;
use crate::utils::date::format_date;
use crate::utils::time::now_stamp;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

const SELECT_DOCUMENT: &str = "
    SELECT d.id, d.filename, d.uploader_id, u.full_name AS uploader_name, d.status,
           d.upload_date, d.last_modified, d.file_type, d.file_size, d.description
    FROM documents d
    JOIN users u ON d.uploader_id = u.id";

/// A file handed in by a user. Only its metadata is stored.
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub document: Document,
    pub enrichment: EnrichOutcome,
}

/// Optional search criteria; `None` fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub query: Option<String>,
    pub status: Option<DocumentStatus>,
    pub file_type: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

pub struct DocumentLogic;

impl DocumentLogic {
    /// Store the metadata of a new document as `Pending`, then run the
    /// enricher on its bytes. The upload is committed before enrichment
    /// starts, so an enrichment failure never undoes it.
    pub fn upload(
        exec: &QueryExecutor,
        uploader: &User,
        req: &UploadRequest<'_>,
        enricher: &Enricher,
    ) -> AppResult<UploadResult> {
        let filename = req.filename.trim();
        if filename.is_empty() {
            return Err(AppError::InvalidInput("filename is empty".into()));
        }

        let file_type = file_type_of(filename);
        let file_size = i64::try_from(req.bytes.len())
            .map_err(|_| AppError::InvalidInput(format!("{filename} is too large")))?;
        let description = req.description.map(str::trim).filter(|d| !d.is_empty());

        let id = exec.transaction(|tx| {
            let now = now_stamp();
            tx.execute(
                "INSERT INTO documents
                    (filename, uploader_id, status, upload_date, last_modified,
                     file_type, file_size, description)
                 VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6, ?7)",
                params![
                    filename,
                    uploader.id,
                    DocumentStatus::Pending.to_db_str(),
                    now,
                    file_type,
                    file_size,
                    description
                ],
            )?;
            let id = tx.last_insert_rowid();
            AuditLogic::append(
                tx,
                &NewAuditEntry::new(&uploader.email, "upload", "document")
                    .target(id)
                    .details(filename),
            )?;
            Ok(id)
        })?;

        info!(doc_id = id, filename, "document uploaded");

        let enrichment = enricher
            .process(exec, id, file_type.as_deref().unwrap_or(""), req.bytes)
            .unwrap_or_else(|e| {
                warn!(doc_id = id, error = %e, "enrichment result could not be stored");
                EnrichOutcome::Failed {
                    reason: e.to_string(),
                }
            });
        let document = Self::require(exec, id)?;

        Ok(UploadResult {
            document,
            enrichment,
        })
    }

    pub fn approve(exec: &QueryExecutor, manager: &User, id: i64) -> AppResult<Document> {
        Self::decide(exec, manager, id, DocumentStatus::Approved)
    }

    pub fn reject(exec: &QueryExecutor, manager: &User, id: i64) -> AppResult<Document> {
        Self::decide(exec, manager, id, DocumentStatus::Rejected)
    }

    /// Pending → Approved | Rejected. Anything else is refused.
    fn decide(
        exec: &QueryExecutor,
        manager: &User,
        id: i64,
        target: DocumentStatus,
    ) -> AppResult<Document> {
        if !manager.role.is_manager() {
            return Err(AppError::PermissionDenied(format!(
                "{} is not a manager",
                manager.email
            )));
        }

        let action = match target {
            DocumentStatus::Approved => "approve",
            _ => "reject",
        };

        exec.transaction(|tx| {
            let current = current_status(tx, id)?;
            if current != DocumentStatus::Pending {
                return Err(AppError::InvalidTransition(format!(
                    "document {id} is {}, not Pending",
                    current.to_db_str()
                )));
            }

            tx.execute(
                "UPDATE documents SET status = ?1, last_modified = ?2 WHERE id = ?3",
                params![target.to_db_str(), now_stamp(), id],
            )?;
            AuditLogic::append(
                tx,
                &NewAuditEntry::new(&manager.email, action, "document").target(id),
            )?;
            Ok(())
        })?;

        info!(doc_id = id, status = target.to_db_str(), "document reviewed");
        Self::require(exec, id)
    }

    pub fn get(exec: &QueryExecutor, id: i64) -> AppResult<Option<Document>> {
        let sql = format!("{SELECT_DOCUMENT} WHERE d.id = ?1");
        exec.query_opt(&sql, [id], Document::from_row)
    }

    pub fn require(exec: &QueryExecutor, id: i64) -> AppResult<Document> {
        Self::get(exec, id)?.ok_or_else(|| AppError::NotFound(format!("document {id}")))
    }

    /// Documents uploaded by `user_id`, newest first.
    pub fn list_for_user(exec: &QueryExecutor, user_id: i64) -> AppResult<Vec<Document>> {
        let sql = format!("{SELECT_DOCUMENT} WHERE d.uploader_id = ?1 ORDER BY d.upload_date DESC, d.id DESC");
        exec.query(&sql, [user_id], Document::from_row)
    }

    /// Review queue, oldest first.
    /// Review queue, oldest first. Managers only.
    pub fn pending(exec: &QueryExecutor, viewer: &User) -> AppResult<Vec<Document>> {
        if !viewer.role.is_manager() {
            return Err(AppError::PermissionDenied(format!(
                "{} is not a manager",
                viewer.email
            )));
        }
        let sql = format!("{SELECT_DOCUMENT} WHERE d.status = ?1 ORDER BY d.upload_date ASC, d.id ASC");
        exec.query(&sql, [DocumentStatus::Pending.to_db_str()], Document::from_row)
    }

    /// Visible to the uploader and to managers.
    pub fn details(exec: &QueryExecutor, viewer: &User, id: i64) -> AppResult<DocumentDetails> {
        let document = Self::require(exec, id)?;
        if document.uploader_id != viewer.id && !viewer.role.is_manager() {
            return Err(AppError::PermissionDenied(format!(
                "document {id} belongs to another user"
            )));
        }

        let comments = exec.query(
            "SELECT c.id, c.document_id, c.user_id, u.full_name, c.comment_text, c.created_at
             FROM comments c
             JOIN users u ON c.user_id = u.id
             WHERE c.document_id = ?1
             ORDER BY c.created_at ASC, c.id ASC",
            [id],
            Comment::from_row,
        )?;

        let tags = exec.query(
            "SELECT tag_name FROM document_tags WHERE document_id = ?1 ORDER BY tag_name",
            [id],
            |row| row.get(0),
        )?;

        let latest = exec.query_opt(
            "SELECT id, document_id, processed_at, classification, extracted_data,
                    confidence_score, status
             FROM idp_results
             WHERE document_id = ?1 AND status = ?2
             ORDER BY id DESC LIMIT 1",
            params![id, IdpStatus::Success.to_db_str()],
            IdpResult::from_row,
        )?;
        let metadata = latest
            .map(|r| r.extracted_data)
            .unwrap_or_else(|| Value::Object(Default::default()));

        Ok(DocumentDetails {
            document,
            comments,
            tags,
            metadata,
        })
    }

    pub fn status_counts(exec: &QueryExecutor) -> AppResult<StatusCounts> {
        let rows: Vec<(String, i64)> = exec.query(
            "SELECT status, COUNT(*) FROM documents GROUP BY status",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut counts = StatusCounts::default();
        for (status, n) in rows {
            match DocumentStatus::from_db_str(&status) {
                Some(DocumentStatus::Pending) => counts.pending = n,
                Some(DocumentStatus::Approved) => counts.approved = n,
                Some(DocumentStatus::Rejected) => counts.rejected = n,
                None => {}
            }
        }
        Ok(counts)
    }

    pub fn user_stats(exec: &QueryExecutor, user_id: i64, today: NaiveDate) -> AppResult<UserStats> {
        let total_documents =
            exec.query_scalar("SELECT COUNT(*) FROM documents WHERE uploader_id = ?1", [user_id])?;
        let uploaded_today = exec.query_scalar(
            "SELECT COUNT(*) FROM documents WHERE uploader_id = ?1 AND substr(upload_date, 1, 10) = ?2",
            params![user_id, format_date(today)],
        )?;
        let pending_approval = exec.query_scalar(
            "SELECT COUNT(*) FROM documents WHERE uploader_id = ?1 AND status = ?2",
            params![user_id, DocumentStatus::Pending.to_db_str()],
        )?;

        Ok(UserStats {
            total_documents,
            uploaded_today,
            pending_approval,
        })
    }

    /// Search the documents of `user_id`; `None` searches everyone's.
    pub fn search(
        exec: &QueryExecutor,
        user_id: Option<i64>,
        filter: &DocumentFilter,
    ) -> AppResult<Vec<Document>> {
        let pattern = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_contains);
        let file_type = filter.file_type.as_deref().map(|t| t.trim_start_matches('.').to_lowercase());

        let sql = format!(
            "{SELECT_DOCUMENT}
             WHERE (?1 IS NULL OR d.uploader_id = ?1)
               AND (?2 IS NULL OR d.filename LIKE ?2 ESCAPE '\\' OR d.description LIKE ?2 ESCAPE '\\')
               AND (?3 IS NULL OR d.status = ?3)
               AND (?4 IS NULL OR d.file_type = ?4)
               AND (?5 IS NULL OR substr(d.upload_date, 1, 10) = ?5)
             ORDER BY d.upload_date DESC, d.id DESC"
        );

        exec.query(
            &sql,
            params![
                user_id,
                pattern,
                filter.status.map(|s| s.to_db_str()),
                file_type,
                filter.date.map(format_date),
            ],
            Document::from_row,
        )
    }

    pub fn add_comment(exec: &QueryExecutor, author: &User, doc_id: i64, text: &str) -> AppResult<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput("comment is empty".into()));
        }

        let id = exec.transaction(|tx| {
            current_status(tx, doc_id)?;
            tx.execute(
                "INSERT INTO comments (document_id, user_id, comment_text, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![doc_id, author.id, text, now_stamp()],
            )?;
            let id = tx.last_insert_rowid();
            AuditLogic::append(
                tx,
                &NewAuditEntry::new(&author.email, "comment", "document").target(doc_id),
            )?;
            Ok(id)
        })?;

        exec.query_opt(
            "SELECT c.id, c.document_id, c.user_id, u.full_name, c.comment_text, c.created_at
             FROM comments c JOIN users u ON c.user_id = u.id
             WHERE c.id = ?1",
            [id],
            Comment::from_row,
        )?
        .ok_or_else(|| AppError::NotFound(format!("comment {id}")))
    }

    /// Remove a document and everything hanging off it. Owner only.
    pub fn delete(exec: &QueryExecutor, owner: &User, id: i64) -> AppResult<()> {
        exec.transaction(|tx| {
            require_owner(tx, owner, id)?;
            tx.execute("DELETE FROM comments WHERE document_id = ?1", [id])?;
            tx.execute("DELETE FROM document_tags WHERE document_id = ?1", [id])?;
            tx.execute("DELETE FROM idp_results WHERE document_id = ?1", [id])?;
            tx.execute("DELETE FROM documents WHERE id = ?1", [id])?;
            AuditLogic::append(tx, &NewAuditEntry::new(&owner.email, "delete", "document").target(id))?;
            Ok(())
        })?;
        info!(doc_id = id, "document deleted");
        Ok(())
    }

    pub fn update_description(
        exec: &QueryExecutor,
        owner: &User,
        id: i64,
        text: &str,
    ) -> AppResult<Document> {
        let text = text.trim();
        exec.transaction(|tx| {
            require_owner(tx, owner, id)?;
            tx.execute(
                "UPDATE documents SET description = ?1, last_modified = ?2 WHERE id = ?3",
                params![(!text.is_empty()).then_some(text), now_stamp(), id],
            )?;
            AuditLogic::append(
                tx,
                &NewAuditEntry::new(&owner.email, "update", "document")
                    .target(id)
                    .details("description"),
            )?;
            Ok(())
        })?;
        Self::require(exec, id)
    }

    /// Most recently touched documents across all users.
    pub fn recent_activity(exec: &QueryExecutor, limit: usize) -> AppResult<Vec<Document>> {
        let sql = format!("{SELECT_DOCUMENT} ORDER BY d.last_modified DESC, d.id DESC LIMIT ?1");
        exec.query(&sql, [limit_param(limit)], Document::from_row)
    }

    pub fn idp_log(exec: &QueryExecutor, limit: usize) -> AppResult<Vec<IdpLogEntry>> {
        exec.query(
            "SELECT d.filename, r.status, r.classification
             FROM idp_results r
             JOIN documents d ON r.document_id = d.id
             ORDER BY r.processed_at DESC, r.id DESC
             LIMIT ?1",
            [limit_param(limit)],
            |row| {
                Ok(IdpLogEntry {
                    doc: row.get(0)?,
                    status: row.get(1)?,
                    action: row.get(2)?,
                })
            },
        )
    }
}

/// Lowercased extension, `None` when the name has none.
pub fn file_type_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn current_status(conn: &Connection, id: i64) -> AppResult<DocumentStatus> {
    let status: Option<String> = conn
        .query_row("SELECT status FROM documents WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    let status = status.ok_or_else(|| AppError::NotFound(format!("document {id}")))?;
    DocumentStatus::from_db_str(&status)
        .ok_or_else(|| AppError::InvalidInput(format!("invalid document status: {status}")))
}

fn require_owner(conn: &Connection, owner: &User, id: i64) -> AppResult<()> {
    let uploader: Option<i64> = conn
        .query_row("SELECT uploader_id FROM documents WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    match uploader {
        None => Err(AppError::NotFound(format!("document {id}"))),
        Some(uid) if uid != owner.id => Err(AppError::PermissionDenied(format!(
            "document {id} belongs to another user"
        ))),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::file_type_of;

    #[test]
    fn file_type_from_extension() {
        assert_eq!(file_type_of("Report.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_type_of("notes.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_type_of("README"), None);
    }
}
