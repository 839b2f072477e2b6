//! Metadata document parsing
//!
//! Each item may carry one structured metadata document describing the book.
//! The transfer engine only cares about a single field, the publication date,
//! which gates ingest when a publication retention window is configured.
//!
//! A missing document or a document without a publication date is an expected
//! not-ready condition. A document that exists but cannot be parsed is
//! malformed input and fails the item.

use bookferry_types::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Subset of the metadata document the transfer engine reads
///
/// All other fields of the document are ignored here; they travel with the
/// item as opaque payload.
#[derive(Debug, Deserialize)]
struct MetadataDocument {
    #[serde(default)]
    publication_date: Option<String>,
}

/// Extract the publication date from a metadata document
///
/// Returns `Ok(None)` when the document has no publication date field.
/// Returns an error when the document cannot be parsed or the date field is
/// present but not a valid date.
///
/// Accepted date forms: RFC 3339 timestamps and plain `YYYY-MM-DD` dates
/// (interpreted as midnight UTC).
pub async fn find_publication_date(path: &Path) -> Result<Option<DateTime<Utc>>> {
    let data = fs::read(path).await.map_err(|e| Error::Io {
        message: format!(
            "Failed to read metadata document '{}': {}",
            path.display(),
            e
        ),
    })?;

    let document: MetadataDocument = serde_json::from_slice(&data)
        .map_err(|e| Error::metadata(path, e.to_string()))?;

    let Some(raw) = document.publication_date else {
        debug!("No publication date in {}", path.display());
        return Ok(None);
    };

    parse_date(&raw)
        .map(Some)
        .map_err(|message| Error::metadata(path, message))
}

fn parse_date(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| {
            date.and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .and_utc()
        })
        .map_err(|_| format!("Invalid publication date '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write_doc(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("b1.meta.json");
        fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_plain_date() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, r#"{"publication_date": "2019-03-15"}"#).await;

        let date = find_publication_date(&path).await.unwrap().unwrap();
        assert_eq!(date.to_rfc3339(), "2019-03-15T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_rfc3339_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(
            &temp_dir,
            r#"{"publication_date": "2019-03-15T08:30:00+01:00"}"#,
        )
        .await;

        let date = find_publication_date(&path).await.unwrap().unwrap();
        assert_eq!(date.to_rfc3339(), "2019-03-15T07:30:00+00:00");
    }

    #[tokio::test]
    async fn test_absent_field_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, r#"{"title": "Some Book"}"#).await;

        assert!(find_publication_date(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_document_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "<not json>").await;

        let err = find_publication_date(&path).await.unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_unparsable_date_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, r#"{"publication_date": "15/03/2019"}"#).await;

        let err = find_publication_date(&path).await.unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_missing_document_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = find_publication_date(&temp_dir.path().join("missing.meta.json")).await;
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
