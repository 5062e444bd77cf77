//! # File Document Store
//!
//! Layout under `<root>/documents/`:
//!
//! ```text
//! documents/
//! ├── index.json        // metadata only, so listing never reads content
//! └── items/<id>.json   // one file per document
//! ```
//!
//! Document files live in their own directory so no id can collide with the
//! index. All writes use atomic rename (write `.tmp`, then `rename()`) for
//! crash safety.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use super::{Document, DocumentMeta, DocumentStore, StoreError, sort_newest_first};

const INDEX_FILE: &str = "index.json";
const ITEMS_DIR: &str = "items";

#[derive(Serialize, Deserialize, Default, Debug)]
struct DocumentIndex {
    documents: Vec<DocumentMeta>,
}

pub struct FileStore {
    dir: PathBuf,
    /// Serializes index read-modify-write cycles.
    index_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = root.as_ref().join("documents");
        fs::create_dir_all(dir.join(ITEMS_DIR)).await?;
        info!("Document store at {}", dir.display());
        Ok(Self {
            dir,
            index_lock: Mutex::new(()),
        })
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.dir.join(ITEMS_DIR).join(format!("{id}.json"))
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    async fn load_index(&self) -> Result<DocumentIndex, StoreError> {
        let path = self.index_path();
        match fs::read_to_string(&path).await {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DocumentIndex::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Ids become file names; refuse anything that could escape the directory.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
async fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&tmp_path, json).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn store(&self, document: &Document) -> Result<(), StoreError> {
        if !is_safe_id(&document.id) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid document id: {:?}", document.id),
            )));
        }

        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        let existed = index.documents.iter().any(|m| m.id == document.id);

        let path = self.document_path(&document.id);
        atomic_write_json(&path, document).await?;

        index.documents.retain(|m| m.id != document.id);
        index.documents.push(document.meta());
        sort_newest_first(&mut index.documents);
        if let Err(e) = atomic_write_json(&self.index_path(), &index).await {
            // A new document must not outlive a failed index update
            if !existed && let Err(rm) = fs::remove_file(&path).await {
                warn!("Failed to remove orphaned document {}: {}", path.display(), rm);
            }
            return Err(e);
        }

        debug!("Stored document {} ({} bytes)", document.id, document.size);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        if !is_safe_id(id) {
            return Ok(None);
        }
        match fs::read_to_string(self.document_path(id)).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<DocumentMeta>, StoreError> {
        Ok(self.load_index().await?.documents)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if !is_safe_id(id) {
            return Ok(());
        }

        let _guard = self.index_lock.lock().await;
        let mut index = self.load_index().await?;
        match fs::remove_file(self.document_path(id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let before = index.documents.len();
        index.documents.retain(|m| m.id != id);
        if index.documents.len() != before {
            atomic_write_json(&self.index_path(), &index).await?;
        }

        debug!("Deleted document {}", id);
        Ok(())
    }
}
