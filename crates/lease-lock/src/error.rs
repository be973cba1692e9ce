//! Error types for lease locks.
//!
//! Failures fall into three groups:
//!
//! - **Usage errors**: `MissingName`, `InvalidConfiguration`, `AlreadyHeld`, `NotAcquired`.
//!   Raised locally, no store interaction happens.
//! - **Store errors**: anything the datastore reports. Propagated verbatim, never retried.
//! - **Contention outcomes**: `PollTimeout` and `Cancelled`, which end a polling loop
//!   without any infrastructure failure.

use thiserror::Error;

/// Opaque failure reported by a [`crate::LockStore`] implementation.
///
/// Connectivity, serialization and schema problems all land here. The message is
/// kept as a string so the error stays cheap to clone across tasks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("store error: {message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Outcome of a failed `insert_unique`.
///
/// Duplicate keys are contention, not failure, so they get their own variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InsertError {
    /// A record with the same name already exists
    #[error("a lock record named '{name}' already exists")]
    DuplicateKey { name: String },

    /// Any other store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors returned by [`crate::LockHandle`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    /// Lock name was empty
    #[error("lock name is required")]
    MissingName,

    /// Timing options rejected at construction
    #[error("invalid lock configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// `acquire` called on a handle that already holds its lock
    #[error("lock '{name}' is already acquired by this handle")]
    AlreadyHeld { name: String },

    /// `release` called on a handle that holds nothing
    #[error("cannot release lock '{name}': it was not acquired")]
    NotAcquired { name: String },

    /// The store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Attempt budget exhausted while polling
    #[error("timed out polling for lock '{name}' after {attempts} attempts")]
    PollTimeout { name: String, attempts: u32 },

    /// Polling stopped by the caller's cancellation signal
    #[error("polling for lock '{name}' cancelled after {attempts} attempts")]
    Cancelled { name: String, attempts: u32 },
}

impl LockError {
    /// Stable machine-readable code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingName => "MISSING_NAME",
            Self::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            Self::AlreadyHeld { .. } => "LOCK_ALREADY_HELD",
            Self::NotAcquired { .. } => "LOCK_NOT_ACQUIRED",
            Self::Store(_) => "STORE_ERROR",
            Self::PollTimeout { .. } => "POLL_TIMEOUT",
            Self::Cancelled { .. } => "POLL_CANCELLED",
        }
    }

    /// Whether the error came from the datastore rather than from lock usage
    /// or contention.
    pub const fn is_store_error(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    pub(crate) fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LockError>;
