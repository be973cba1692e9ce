//! # Lease Lock
//!
//! Cooperative, TTL-based mutual exclusion for a named resource, shared between
//! independent processes through a datastore. There is no lock server: a unique
//! key on the record name and atomic conditional deletes do all the work.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Usage
//!
//! ```no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use lease_lock::{LockHandle, LockOptions, SqliteLockStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteLockStore::connect("sqlite:///tmp/locks.db").await?);
//! let mut lock = LockHandle::new(
//!     store,
//!     "nightly-report",
//!     LockOptions::new().with_timeout(Duration::from_secs(30)),
//! )?;
//!
//! if lock.acquire().await? {
//!     // exclusive section
//!     let expired = lock.release().await?;
//!     if expired {
//!         eprintln!("lease lapsed before release");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Limitations
//!
//! Expiry is judged by each process's local clock. Under clock skew two holders
//! can overlap; there are no fencing tokens, renewals or fairness guarantees.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod config;
mod error;
mod handle;
pub mod logging;
mod poll;
mod record;
pub mod store;

pub use config::{load_toml_file, LockOptions, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
pub use error::{InsertError, LockError, Result, StoreError};
pub use handle::{LockHandle, LockState};
pub use poll::max_poll_attempts;
pub use record::{LockFilter, LockId, LockRecord, NewLockRecord};
pub use store::{LockStore, MemoryLockStore, SqliteLockStore};
