//! Best-effort document enrichment: text extraction + entity tagging.
//!
//! Both steps are opaque capabilities. The entity step may be absent
//! altogether; that is modelled as [`EntityCapability::Unavailable`] and
//! chosen once when the [`Enricher`] is built. Whatever happens here, the
//! document upload itself has already been committed.

use crate::core::audit::AuditLogic;
use crate::db::executor::QueryExecutor;
use crate::errors::AppResult;
use crate::models::audit::NewAuditEntry;
use crate::models::document::IdpStatus;
use crate::utils::time::now_stamp;
use regex::Regex;
use rusqlite::params;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{info, warn};

pub const CLASS_INVOICE: &str = "Invoice";
pub const CLASS_GENERAL: &str = "General Document";
pub const CLASS_UNKNOWN: &str = "Unknown";

/// Actor recorded in the audit log for enrichment writes.
pub const ENRICH_ACTOR: &str = "system";

/// Label → distinct entity strings.
pub type Entities = BTreeMap<String, BTreeSet<String>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EnrichError(pub String);

/// "Given bytes, return text". An empty string means nothing was found.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, file_type: &str, bytes: &[u8]) -> Result<String, EnrichError>;
}

/// "Given text, return entities".
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Entities, EnrichError>;
}

pub enum EntityCapability {
    Available(Box<dyn EntityRecognizer>),
    Unavailable,
}

impl EntityCapability {
    pub fn is_available(&self) -> bool {
        matches!(self, EntityCapability::Available(_))
    }
}

/// Reads UTF-8 text formats; anything else yields no text.
pub struct PlainTextExtractor;

const TEXT_TYPES: [&str; 6] = ["txt", "md", "csv", "json", "log", "html"];

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, file_type: &str, bytes: &[u8]) -> Result<String, EnrichError> {
        if !TEXT_TYPES.contains(&file_type) {
            return Ok(String::new());
        }
        String::from_utf8(bytes.to_vec())
            .map_err(|e| EnrichError(format!("{file_type} file is not valid UTF-8: {e}")))
    }
}

/// Regex-based recognizer for a handful of entity labels.
pub struct PatternRecognizer {
    patterns: Vec<(&'static str, Regex)>,
}

impl PatternRecognizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: vec![
                ("EMAIL", Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")?),
                ("DATE", Regex::new(r"\b\d{4}-\d{2}-\d{2}\b|\b\d{2}/\d{2}/\d{4}\b")?),
                ("MONEY", Regex::new(r"(?:[$€£₹]|\bINR\s?|\bRs\.?\s?)\d[\d,]*(?:\.\d{2})?")?),
                ("INVOICE_NO", Regex::new(r"(?i)\binv(?:oice)?[-\s#:]*([A-Z0-9]*\d[A-Z0-9-]*)")?),
            ],
        })
    }
}

impl EntityRecognizer for PatternRecognizer {
    fn recognize(&self, text: &str) -> Result<Entities, EnrichError> {
        let mut entities = Entities::new();
        for (label, re) in &self.patterns {
            for m in re.find_iter(text) {
                entities
                    .entry(label.to_string())
                    .or_default()
                    .insert(m.as_str().trim().to_string());
            }
        }
        Ok(entities)
    }
}

/// What one enrichment attempt ended with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum EnrichOutcome {
    /// No text could be extracted; nothing was stored.
    Skipped,
    Success {
        classification: String,
        entities: Entities,
    },
    Failed {
        reason: String,
    },
}

pub struct Enricher {
    extractor: Box<dyn TextExtractor>,
    entities: EntityCapability,
}

impl Enricher {
    pub fn new(extractor: Box<dyn TextExtractor>, entities: EntityCapability) -> Self {
        Self {
            extractor,
            entities,
        }
    }

    /// Built-in capabilities; `nlp_enabled = false` selects `Unavailable`.
    pub fn from_config(nlp_enabled: bool) -> Self {
        let entities = if nlp_enabled {
            match PatternRecognizer::new() {
                Ok(r) => EntityCapability::Available(Box::new(r)),
                Err(e) => {
                    warn!(error = %e, "entity recognizer unavailable");
                    EntityCapability::Unavailable
                }
            }
        } else {
            EntityCapability::Unavailable
        };
        Self::new(Box::new(PlainTextExtractor), entities)
    }

    pub fn entities_available(&self) -> bool {
        self.entities.is_available()
    }

    /// Extract, tag, and store the result for `doc_id`.
    ///
    /// Never returns an error for an enrichment failure: that is recorded
    /// as a `Failed` idp row. Only a failure to record the failure itself
    /// is propagated.
    pub fn process(
        &self,
        exec: &QueryExecutor,
        doc_id: i64,
        file_type: &str,
        bytes: &[u8],
    ) -> AppResult<EnrichOutcome> {
        let analysed = self.analyse(file_type, bytes);

        let outcome = match analysed {
            Ok(None) => return Ok(EnrichOutcome::Skipped),
            Ok(Some((classification, entities))) => {
                match store_success(exec, doc_id, &classification, &entities) {
                    Ok(()) => EnrichOutcome::Success {
                        classification,
                        entities,
                    },
                    Err(e) => EnrichOutcome::Failed {
                        reason: e.to_string(),
                    },
                }
            }
            Err(e) => EnrichOutcome::Failed { reason: e.0 },
        };

        match &outcome {
            EnrichOutcome::Failed { reason } => {
                warn!(doc_id, reason = %reason, "document enrichment failed");
                store_failure(exec, doc_id)?;
            }
            EnrichOutcome::Success { classification, .. } => {
                info!(doc_id, classification = %classification, "document enriched");
            }
            EnrichOutcome::Skipped => {}
        }
        Ok(outcome)
    }

    fn analyse(&self, file_type: &str, bytes: &[u8]) -> Result<Option<(String, Entities)>, EnrichError> {
        let text = self.extractor.extract(&file_type.to_lowercase(), bytes)?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let entities = match &self.entities {
            EntityCapability::Available(recognizer) => recognizer.recognize(&text)?,
            EntityCapability::Unavailable => Entities::new(),
        };

        Ok(Some((classify(&text).to_string(), entities)))
    }
}

pub fn classify(text: &str) -> &'static str {
    if text.to_lowercase().contains("invoice") {
        CLASS_INVOICE
    } else {
        CLASS_GENERAL
    }
}

fn store_success(
    exec: &QueryExecutor,
    doc_id: i64,
    classification: &str,
    entities: &Entities,
) -> AppResult<()> {
    let data = serde_json::to_string(entities)?;
    exec.transaction(|tx| {
        tx.execute(
            "INSERT INTO idp_results
                (document_id, processed_at, classification, extracted_data, confidence_score, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                doc_id,
                now_stamp(),
                classification,
                data,
                0.0_f64,
                IdpStatus::Success.to_db_str()
            ],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO document_tags (document_id, tag_name) VALUES (?1, ?2)",
            params![doc_id, classification],
        )?;
        AuditLogic::append(
            tx,
            &NewAuditEntry::new(ENRICH_ACTOR, "enrich", "document")
                .target(doc_id)
                .details(format!("{}: {classification}", IdpStatus::Success.to_db_str())),
        )?;
        Ok(())
    })
}

fn store_failure(exec: &QueryExecutor, doc_id: i64) -> AppResult<()> {
    exec.transaction(|tx| {
        tx.execute(
            "INSERT INTO idp_results
                (document_id, processed_at, classification, extracted_data, confidence_score, status)
             VALUES (?1, ?2, ?3, '{}', 0.0, ?4)",
            params![
                doc_id,
                now_stamp(),
                CLASS_UNKNOWN,
                IdpStatus::Failed.to_db_str()
            ],
        )?;
        AuditLogic::append(
            tx,
            &NewAuditEntry::new(ENRICH_ACTOR, "enrich", "document")
                .target(doc_id)
                .details(format!("{}: {CLASS_UNKNOWN}", IdpStatus::Failed.to_db_str())),
        )?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_keyword_based() {
        assert_eq!(classify("INVOICE #42 total"), CLASS_INVOICE);
        assert_eq!(classify("meeting notes"), CLASS_GENERAL);
    }

    #[test]
    fn pattern_recognizer_dedupes() {
        let r = PatternRecognizer::new().unwrap();
        let e = r
            .recognize("mail a@b.com and a@b.com on 2025-01-31, pay $1,200.00")
            .unwrap();
        assert_eq!(e["EMAIL"].len(), 1);
        assert!(e["DATE"].contains("2025-01-31"));
        assert!(e["MONEY"].contains("$1,200.00"));
    }

    #[test]
    fn enrich_error_displays_its_reason() {
        let err: Box<dyn std::error::Error> = Box::new(EnrichError("bad bytes".into()));
        assert_eq!(err.to_string(), "bad bytes");
    }

    #[test]
    fn binary_types_yield_no_text() {
        assert_eq!(PlainTextExtractor.extract("pdf", b"%PDF-1.7").unwrap(), "");
        assert!(PlainTextExtractor.extract("txt", &[0xff, 0xfe]).is_err());
    }
}
