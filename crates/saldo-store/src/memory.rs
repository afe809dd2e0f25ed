//! Process-local store backend

use async_trait::async_trait;
use saldo_core::{NewTransaction, Transaction, TransactionPatch};
use tokio::sync::RwLock;

use crate::collection::Collection;
use crate::error::StoreResult;
use crate::TransactionStore;

/// Keeps the collection in memory; contents are lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    collection: RwLock<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.collection.read().await.ordered())
    }

    async fn create(&self, new: NewTransaction) -> StoreResult<Transaction> {
        self.collection.write().await.insert(new)
    }

    async fn update(&self, id: &str, patch: TransactionPatch) -> StoreResult<Transaction> {
        self.collection.write().await.update(id, &patch)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.collection.write().await.remove(id))
    }

    async fn delete_all(&self) -> StoreResult<usize> {
        Ok(self.collection.write().await.clear())
    }

    fn describe(&self) -> String {
        "memory://".to_string()
    }
}
