//! Lock handle: one party's view of a named lease.
//!
//! # State machine
//!
//! ```text
//! Idle --acquire (inserted)--------> Held
//! Idle --acquire (contended)-------> Idle
//! Held --acquire-------------------> Held   (AlreadyHeld, no store call)
//! Held --release (still valid)-----> Idle   (expired = false)
//! Held --release (lease lapsed)----> Idle   (expired = true)
//! Idle --release-------------------> Idle   (NotAcquired, no store call)
//! ```
//!
//! There is no terminal state; a handle can cycle forever. A handle is driven by
//! one task at a time (`&mut self`); many handles, in any number of processes,
//! may race on the same store.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::LockOptions;
use crate::error::{InsertError, LockError, Result};
use crate::poll::max_poll_attempts;
use crate::record::{now_millis, LockFilter, LockId, NewLockRecord};
use crate::store::LockStore;

/// Whether a handle currently believes it holds its lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Idle,
    Held,
}

/// Exclusive, time-bounded claim on a named resource.
pub struct LockHandle {
    store: Arc<dyn LockStore>,
    name: String,
    timeout: Duration,
    lease: chrono::Duration,
    pub(crate) poll_interval: Duration,
    pub(crate) max_poll_attempts: u32,
    time_acquired: Option<DateTime<Utc>>,
    lock_id: Option<LockId>,
}

impl LockHandle {
    /// Create an idle handle for `name`, coordinating through `store`.
    ///
    /// Zero durations in `options` mean "unset" and take their defaults.
    ///
    /// # Errors
    ///
    /// - `MissingName` if `name` is empty
    /// - `InvalidConfiguration` if a lease of `timeout` would run past the
    ///   clock's range
    pub fn new(
        store: Arc<dyn LockStore>,
        name: impl Into<String>,
        options: LockOptions,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(LockError::MissingName);
        }
        let options = options.normalized();
        let lease = options.lease()?;

        Ok(Self {
            store,
            name,
            timeout: options.timeout,
            lease,
            poll_interval: options.poll_interval,
            max_poll_attempts: max_poll_attempts(options.timeout, options.poll_interval),
            time_acquired: None,
            lock_id: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Attempt budget of [`Self::poll_acquire`]: `ceil(timeout / poll_interval) + 2`.
    pub const fn max_poll_attempts(&self) -> u32 {
        self.max_poll_attempts
    }

    /// When the current lease was claimed, if held.
    pub const fn time_acquired(&self) -> Option<DateTime<Utc>> {
        self.time_acquired
    }

    /// Store identifier of the current lease, if held.
    pub const fn lock_id(&self) -> Option<&LockId> {
        self.lock_id.as_ref()
    }

    pub const fn is_held(&self) -> bool {
        self.lock_id.is_some()
    }

    pub const fn state(&self) -> LockState {
        if self.is_held() {
            LockState::Held
        } else {
            LockState::Idle
        }
    }

    /// Try once to become the exclusive holder of the lease.
    ///
    /// Sweeps this name's expired record (if any) and then inserts a fresh one.
    /// Returns `Ok(false)` when another holder's lease is still live.
    ///
    /// # Errors
    ///
    /// - `AlreadyHeld` if this handle already holds the lease
    /// - `InvalidConfiguration` if the lease would end past the clock's range;
    ///   no store call is made
    /// - `Store` if either store operation fails
    pub async fn acquire(&mut self) -> Result<bool> {
        if self.is_held() {
            return Err(LockError::AlreadyHeld {
                name: self.name.clone(),
            });
        }

        let now = now_millis();
        let expire = now.checked_add_signed(self.lease).ok_or_else(|| {
            LockError::invalid_configuration(format!(
                "lease of {:?} overflows the clock",
                self.timeout
            ))
        })?;

        // Sweep first: an expired record still occupies the unique key.
        let swept = self
            .store
            .remove_matching(&LockFilter::ExpiredBefore {
                name: self.name.clone(),
                now,
            })
            .await?;
        if let Some(stale) = swept {
            tracing::debug!(
                lock = %self.name,
                stale_id = %stale.id,
                expired_at = %stale.expire,
                "Removed expired lock record"
            );
        }

        let record = NewLockRecord {
            name: self.name.clone(),
            expire,
            inserted: now,
        };

        match self.store.insert_unique(&record).await {
            Ok(id) => {
                tracing::info!(lock = %self.name, lock_id = %id, expire = %expire, "Acquired lock");
                self.lock_id = Some(id);
                self.time_acquired = Some(now);
                Ok(true)
            }
            Err(InsertError::DuplicateKey { .. }) => {
                tracing::debug!(lock = %self.name, "Lock held elsewhere");
                Ok(false)
            }
            Err(InsertError::Store(e)) => Err(e.into()),
        }
    }

    /// Give up the lease.
    ///
    /// Returns `Ok(true)` when the lease had already lapsed (and may belong to
    /// someone else by now); the local claim is retracted either way.
    ///
    /// # Errors
    ///
    /// - `NotAcquired` if this handle holds nothing
    /// - `Store` if the delete fails; local state is then left untouched
    pub async fn release(&mut self) -> Result<bool> {
        let Some(id) = self.lock_id.clone() else {
            return Err(LockError::NotAcquired {
                name: self.name.clone(),
            });
        };

        let removed = self
            .store
            .remove_matching(&LockFilter::LiveById {
                id: id.clone(),
                now: now_millis(),
            })
            .await?;

        self.lock_id = None;
        self.time_acquired = None;

        if removed.is_some() {
            tracing::info!(lock = %self.name, lock_id = %id, "Released lock");
            Ok(false)
        } else {
            tracing::warn!(
                lock = %self.name,
                lock_id = %id,
                "Lock expired before release; local claim retracted"
            );
            Ok(true)
        }
    }
}

impl fmt::Debug for LockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockHandle")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("time_acquired", &self.time_acquired)
            .field("lock_id", &self.lock_id)
            .finish_non_exhaustive()
    }
}
