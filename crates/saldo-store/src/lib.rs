//! Document store for transaction records
//!
//! The store is pure persistence: it assigns identifiers and timestamps,
//! checks the shape of incoming records, and keeps them in creation order.
//! Balances are never stored.

use async_trait::async_trait;
use saldo_core::{NewTransaction, Transaction, TransactionPatch};
use std::sync::Arc;

pub mod collection;
pub mod error;
pub mod file;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Store reference type
pub type StoreRef = Arc<dyn TransactionStore>;

/// Trait for transaction stores
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// All records by ascending creation order
    async fn list(&self) -> StoreResult<Vec<Transaction>>;

    /// Persist a new record and return it with its identifier and timestamps
    async fn create(&self, new: NewTransaction) -> StoreResult<Transaction>;

    /// Replace the fields present in `patch`
    async fn update(&self, id: &str, patch: TransactionPatch) -> StoreResult<Transaction>;

    /// Remove a record; an unknown id is not an error. Returns whether a
    /// record was removed.
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Remove every record, returning how many there were
    async fn delete_all(&self) -> StoreResult<usize>;

    /// Connection string this store was opened from
    fn describe(&self) -> String;
}

/// Open the store named by a connection string.
///
/// `memory://` keeps records in the process; `file://<path>` and
/// `json://<path>` use a JSON document file.
pub async fn open_store(uri: &str) -> StoreResult<StoreRef> {
    let uri = uri.trim();
    if uri == "memory://" || uri == "memory:" {
        return Ok(Arc::new(MemoryStore::new()));
    }

    let path = uri
        .strip_prefix("file://")
        .or_else(|| uri.strip_prefix("json://"))
        .filter(|p| !p.is_empty())
        .ok_or_else(|| StoreError::UnsupportedUri { uri: uri.to_string() })?;

    Ok(Arc::new(JsonFileStore::open(path).await?))
}

// ==================== Tests ====================
