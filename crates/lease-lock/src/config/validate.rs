//! Configuration validation

use chrono::Utc;

use super::defaults::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
use super::types::LockOptions;
use crate::{LockError, Result};

impl LockOptions {
    /// Replace unset (zero) durations with their defaults.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            timeout: if self.timeout.is_zero() {
                DEFAULT_TIMEOUT
            } else {
                self.timeout
            },
            poll_interval: if self.poll_interval.is_zero() {
                DEFAULT_POLL_INTERVAL
            } else {
                self.poll_interval
            },
        }
    }

    /// Validate timing options.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a lease of `timeout` starting now would
    /// end past the representable range of the clock.
    pub fn validate(&self) -> Result<()> {
        self.lease().map(|_| ())
    }

    /// `timeout` as a lease length that can be added to the current time.
    pub(crate) fn lease(&self) -> Result<chrono::Duration> {
        let lease = chrono::Duration::from_std(self.timeout).map_err(|e| {
            LockError::invalid_configuration(format!(
                "timeout {:?} is out of range: {e}",
                self.timeout
            ))
        })?;

        Utc::now().checked_add_signed(lease).ok_or_else(|| {
            LockError::invalid_configuration(format!(
                "lease of {:?} overflows the clock",
                self.timeout
            ))
        })?;

        Ok(lease)
    }
}
