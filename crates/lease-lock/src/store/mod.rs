//! Store Adapter - the persistence boundary for lock records.
//!
//! All mutual exclusion comes from two atomic operations the backing datastore
//! must provide:
//!
//! - a conditional delete that removes at most one matching record and returns it
//! - an insert that fails distinctly when a record with the same `name` exists
//!
//! The handle performs no in-process locking of its own; swap the store to change
//! where the coordination happens (`SQLite`, in-memory, ...).

mod memory;
mod sqlite;

pub use memory::MemoryLockStore;
pub use sqlite::SqliteLockStore;

use crate::error::{InsertError, StoreError};
use crate::record::{LockFilter, LockId, LockRecord, NewLockRecord};

/// Trait defining the persistence boundary for lease locks.
///
/// The uniqueness constraint on `name` must hold for every record, expired or not:
/// a stale record keeps blocking inserts until something removes it.
#[async_trait::async_trait]
pub trait LockStore: Send + Sync {
    /// Atomically find and delete at most one record matching `filter`.
    async fn remove_matching(
        &self,
        filter: &LockFilter,
    ) -> std::result::Result<Option<LockRecord>, StoreError>;

    /// Atomically insert `record`, returning the identifier the store assigned.
    async fn insert_unique(
        &self,
        record: &NewLockRecord,
    ) -> std::result::Result<LockId, InsertError>;
}
