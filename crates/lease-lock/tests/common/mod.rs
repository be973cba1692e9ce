//! Shared test doubles and fixtures for lease-lock integration tests

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lease_lock::{
    InsertError, LockFilter, LockHandle, LockId, LockOptions, LockRecord, LockStore,
    MemoryLockStore, NewLockRecord, StoreError,
};

pub const NAME: &str = "testLock";

/// `timeout = 500ms`, `poll_interval = 100ms`.
pub fn lock_config() -> LockOptions {
    LockOptions::new()
        .with_timeout(Duration::from_millis(500))
        .with_poll_interval(Duration::from_millis(100))
}

pub fn handle(store: Arc<dyn LockStore>, name: &str, options: LockOptions) -> LockHandle {
    LockHandle::new(store, name, options).expect("valid handle")
}

/// Memory store that counts every call made through it.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub inner: MemoryLockStore,
    removes: AtomicUsize,
    inserts: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.removes() + self.inserts()
    }
}

#[async_trait::async_trait]
impl LockStore for RecordingStore {
    async fn remove_matching(
        &self,
        filter: &LockFilter,
    ) -> Result<Option<LockRecord>, StoreError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove_matching(filter).await
    }

    async fn insert_unique(&self, record: &NewLockRecord) -> Result<LockId, InsertError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_unique(record).await
    }
}

/// Which store operation a [`FailingStore`] breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Remove,
    Insert,
}

/// Memory store whose chosen operation fails with a store error while armed.
#[derive(Debug)]
pub struct FailingStore {
    pub inner: MemoryLockStore,
    fail_on: FailOn,
    armed: AtomicBool,
    calls: AtomicUsize,
}

impl FailingStore {
    /// Failing from the first call.
    pub fn new(fail_on: FailOn) -> Self {
        let store = Self::disarmed(fail_on);
        store.arm();
        store
    }

    /// Healthy until [`Self::arm`] is called.
    pub fn disarmed(fail_on: FailOn) -> Self {
        Self {
            inner: MemoryLockStore::new(),
            fail_on,
            armed: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fails(&self, op: FailOn) -> bool {
        self.fail_on == op && self.armed.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LockStore for FailingStore {
    async fn remove_matching(
        &self,
        filter: &LockFilter,
    ) -> Result<Option<LockRecord>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fails(FailOn::Remove) {
            return Err(StoreError::new("connection reset"));
        }
        self.inner.remove_matching(filter).await
    }

    async fn insert_unique(&self, record: &NewLockRecord) -> Result<LockId, InsertError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fails(FailOn::Insert) {
            return Err(InsertError::Store(StoreError::new("disk full")));
        }
        self.inner.insert_unique(record).await
    }
}
