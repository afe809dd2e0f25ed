//! JSON document file store backend
//!
//! The whole collection lives in one JSON array. It is read once when the
//! store opens and rewritten after every mutation through a temporary file
//! that is renamed over the original. A mutation only becomes visible once
//! that write succeeded.

use async_trait::async_trait;
use saldo_core::{NewTransaction, Transaction, TransactionPatch};
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::collection::Collection;
use crate::error::{StoreError, StoreResult};
use crate::TransactionStore;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    collection: RwLock<Collection>,
}

impl JsonFileStore {
    /// Open the document file, creating parent directories when needed.
    /// A missing or empty file starts an empty collection.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let collection = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Collection::default(),
            Ok(content) => {
                let records: Vec<Transaction> =
                    serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                Collection::from_records(records)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Collection::default(),
            Err(e) => return Err(e.into()),
        };

        log::info!("opened {} with {} records", path.display(), collection.len());
        Ok(Self {
            path,
            collection: RwLock::new(collection),
        })
    }

    async fn persist(&self, collection: &Collection) -> StoreResult<()> {
        let content = serde_json::to_vec_pretty(collection).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for JsonFileStore {
    async fn list(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.collection.read().await.ordered())
    }

    async fn create(&self, new: NewTransaction) -> StoreResult<Transaction> {
        let mut collection = self.collection.write().await;
        let mut next = collection.clone();
        let record = next.insert(new)?;
        self.persist(&next).await?;
        *collection = next;
        Ok(record)
    }

    async fn update(&self, id: &str, patch: TransactionPatch) -> StoreResult<Transaction> {
        let mut collection = self.collection.write().await;
        let mut next = collection.clone();
        let record = next.update(id, &patch)?;
        self.persist(&next).await?;
        *collection = next;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut collection = self.collection.write().await;
        let mut next = collection.clone();
        if !next.remove(id) {
            return Ok(false);
        }
        self.persist(&next).await?;
        *collection = next;
        Ok(true)
    }

    async fn delete_all(&self) -> StoreResult<usize> {
        let mut collection = self.collection.write().await;
        let removed = collection.len();
        self.persist(&Collection::default()).await?;
        collection.clear();
        Ok(removed)
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}
