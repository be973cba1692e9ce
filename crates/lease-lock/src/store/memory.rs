//! In-process lock store.
//!
//! Coordinates handles within one process, and stands in for a shared datastore
//! in tests.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::LockStore;
use crate::error::{InsertError, StoreError};
use crate::record::{LockFilter, LockId, LockRecord, NewLockRecord};

/// Lock records keyed by name, which doubles as the uniqueness constraint.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryLockStore {
    records: Arc<Mutex<HashMap<String, LockRecord>>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, expired ones included, ordered by name.
    pub async fn records(&self) -> Vec<LockRecord> {
        let mut records: Vec<LockRecord> = self.records.lock().await.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }
}

#[async_trait::async_trait]
impl LockStore for MemoryLockStore {
    async fn remove_matching(
        &self,
        filter: &LockFilter,
    ) -> std::result::Result<Option<LockRecord>, StoreError> {
        let mut records = self.records.lock().await;

        let key = records
            .iter()
            .find(|(_, record)| filter.matches(record))
            .map(|(name, _)| name.clone());

        Ok(key.and_then(|name| records.remove(&name)))
    }

    async fn insert_unique(
        &self,
        record: &NewLockRecord,
    ) -> std::result::Result<LockId, InsertError> {
        let mut records = self.records.lock().await;

        if records.contains_key(&record.name) {
            return Err(InsertError::DuplicateKey {
                name: record.name.clone(),
            });
        }

        let id = LockId::generate();
        records.insert(record.name.clone(), record.clone().into_record(id.clone()));
        drop(records);

        Ok(id)
    }
}
