use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Document, DocumentMeta, DocumentStore, StoreError, sort_newest_first};

/// In-process store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn store(&self, document: &Document) -> Result<(), StoreError> {
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<DocumentMeta>, StoreError> {
        let mut metas: Vec<_> = self.documents.read().await.values().map(Document::meta).collect();
        sort_newest_first(&mut metas);
        Ok(metas)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.documents.write().await.remove(id);
        Ok(())
    }
}
