//! Default configuration values

use std::time::Duration;

use super::types::LockOptions;

/// Lease length when none is configured (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Poll interval when none is configured (500 ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
