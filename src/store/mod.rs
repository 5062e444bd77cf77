//! # Document Store
//!
//! Uploaded documents keyed by id. The chat path only needs `get`; the CLI
//! uses the rest.
//!
//! ```text
//! DocumentStore (trait)
//! ├── FileStore    // <data_dir>/documents/<id>.json + documents.json index
//! └── MemoryStore  // HashMap behind a RwLock, for tests and embedding
//! ```

use std::fmt;
use std::io;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A stored document and its extracted text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Content length in bytes.
    pub size: u64,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub uploaded_at: i64,
}

impl Document {
    pub fn from_text(name: impl Into<String>, mime_type: impl Into<String>, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            mime_type: mime_type.into(),
            size: content.len() as u64,
            content,
            uploaded_at: Utc::now().timestamp_millis(),
        }
    }

    pub fn meta(&self) -> DocumentMeta {
        DocumentMeta {
            id: self.id.clone(),
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            size: self.size,
            uploaded_at: self.uploaded_at,
        }
    }
}

/// Document without its content, for listings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    pub uploaded_at: i64,
}

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "document store I/O error: {e}"),
            StoreError::Parse(e) => write!(f, "document store parse error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Parse(e)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts or replaces a document.
    async fn store(&self, document: &Document) -> Result<(), StoreError>;

    /// Fetches a document by id. `Ok(None)` when absent.
    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError>;

    /// Lists documents, most recently uploaded first.
    async fn list(&self) -> Result<Vec<DocumentMeta>, StoreError>;

    /// Deletes a document. Deleting a missing id is not an error.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Sort newest upload first; ties fall back to id for a stable order.
fn sort_newest_first(metas: &mut [DocumentMeta]) {
    metas.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_measures_bytes() {
        let doc = Document::from_text("plan.pdf", "application/pdf", "Plan X covers dental.".into());
        assert_eq!(doc.size, 21);
        assert!(!doc.id.is_empty());
        assert_eq!(doc.meta().name, "plan.pdf");
    }

    #[test]
    fn test_document_serializes_with_wire_names() {
        let doc = Document {
            id: "d1".into(),
            name: "plan.pdf".into(),
            mime_type: "application/pdf".into(),
            size: 4,
            content: "text".into(),
            uploaded_at: 1,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "application/pdf");
        assert_eq!(json["uploadedAt"], 1);
    }

    #[test]
    fn test_sort_newest_first() {
        let meta = |id: &str, at: i64| DocumentMeta {
            id: id.into(),
            name: String::new(),
            mime_type: String::new(),
            size: 0,
            uploaded_at: at,
        };
        let mut metas = vec![meta("a", 1), meta("c", 3), meta("b", 3)];
        sort_newest_first(&mut metas);
        let ids: Vec<_> = metas.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }
}
