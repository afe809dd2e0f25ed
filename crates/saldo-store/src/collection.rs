//! In-memory record collection shared by the store backends

use chrono::Utc;
use saldo_core::{NewTransaction, Transaction, TransactionPatch};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Records in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    records: Vec<Transaction>,
}

impl Collection {
    pub fn from_records(records: Vec<Transaction>) -> Self {
        let records = records.into_iter().map(Transaction::without_balance).collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records by ascending creation time; ties keep insertion order
    pub fn ordered(&self) -> Vec<Transaction> {
        let mut records = self.records.clone();
        records.sort_by_key(|tx| tx.created_at);
        records
    }

    pub fn insert(&mut self, new: NewTransaction) -> StoreResult<Transaction> {
        new.validate_shape()?;

        let now = Utc::now();
        let record = Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            date: new.date,
            date_iso: new.date_iso,
            kind: new.kind,
            amount: new.amount,
            description: new.description,
            created_at: now,
            updated_at: now,
            balance: None,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn update(&mut self, id: &str, patch: &TransactionPatch) -> StoreResult<Transaction> {
        patch.validate_shape()?;

        let record = self
            .records
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        record.apply_patch(patch);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    /// Returns whether a record was removed
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|tx| tx.id != id);
        self.records.len() != before
    }

    /// Returns the number of removed records
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }
}
