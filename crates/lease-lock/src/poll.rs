//! Bounded polling on top of [`LockHandle::acquire`].
//!
//! The budget is counted in attempts, not wall-clock time, so a poll can run a
//! little past `timeout` when store calls are slow.

use std::future::Future;
use std::time::Duration;

use crate::error::{LockError, Result};
use crate::handle::LockHandle;

/// `ceil(timeout / poll_interval) + 2`, saturating.
///
/// A zero `poll_interval` is treated as one nanosecond; handles reject it at
/// construction anyway.
pub fn max_poll_attempts(timeout: Duration, poll_interval: Duration) -> u32 {
    let rounds = timeout.as_nanos().div_ceil(poll_interval.as_nanos().max(1));
    u32::try_from(rounds).unwrap_or(u32::MAX).saturating_add(2)
}

impl LockHandle {
    /// Retry [`Self::acquire`] every `poll_interval` until it succeeds or the
    /// attempt budget runs out.
    ///
    /// Returns `Ok(true)` once acquired.
    ///
    /// # Errors
    ///
    /// - `PollTimeout` after `max_poll_attempts` contended attempts
    /// - any error from `acquire`, immediately and without retry
    pub async fn poll_acquire(&mut self) -> Result<bool> {
        self.poll_acquire_with_cancel(futures::future::pending()).await
    }

    /// [`Self::poll_acquire`] that also gives up at `deadline`.
    pub async fn poll_acquire_until(&mut self, deadline: tokio::time::Instant) -> Result<bool> {
        self.poll_acquire_with_cancel(tokio::time::sleep_until(deadline)).await
    }

    /// [`Self::poll_acquire`] that stops early once `cancel` completes.
    ///
    /// Cancellation is only observed while waiting between attempts. A store
    /// call in flight always finishes, so a lease that was inserted is always
    /// recorded on the handle.
    ///
    /// # Errors
    ///
    /// - `Cancelled` if `cancel` completed first
    /// - everything [`Self::poll_acquire`] returns
    pub async fn poll_acquire_with_cancel<F>(&mut self, cancel: F) -> Result<bool>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);
        let mut attempts: u32 = 0;

        loop {
            if self.acquire().await? {
                tracing::debug!(lock = %self.name(), attempts = attempts + 1, "Poll acquired lock");
                return Ok(true);
            }

            attempts += 1;
            if attempts >= self.max_poll_attempts {
                tracing::warn!(lock = %self.name(), attempts, "Timed out polling for lock");
                return Err(LockError::PollTimeout {
                    name: self.name().to_string(),
                    attempts,
                });
            }

            tracing::debug!(
                "Lock attempt {}/{} failed, retrying after {}ms: {}",
                attempts,
                self.max_poll_attempts,
                self.poll_interval.as_millis(),
                self.name()
            );

            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {}
                () = &mut cancel => {
                    tracing::info!(lock = %self.name(), attempts, "Polling cancelled");
                    return Err(LockError::Cancelled {
                        name: self.name().to_string(),
                        attempts,
                    });
                }
            }
        }
    }
}
