//! Persisted lock records and the filters stores match them with.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a lock record.
///
/// Opaque to the handle; it is only ever compared for equality. A store must never
/// hand the same id to two different records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockId(String);

impl LockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lease as stored: at most one live record exists per `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub id: LockId,
    pub name: String,
    /// When the lease ends
    pub expire: DateTime<Utc>,
    /// When the lease was claimed
    pub inserted: DateTime<Utc>,
}

impl LockRecord {
    /// Whether the lease is over at `now`. A record expiring exactly at `now` is
    /// neither live nor sweepable.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire < now
    }
}

/// A record the handle asks the store to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLockRecord {
    pub name: String,
    pub expire: DateTime<Utc>,
    pub inserted: DateTime<Utc>,
}

impl NewLockRecord {
    /// Attach the id the store assigned.
    pub fn into_record(self, id: LockId) -> LockRecord {
        LockRecord {
            id,
            name: self.name,
            expire: self.expire,
            inserted: self.inserted,
        }
    }
}

/// Conditions for a conditional delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockFilter {
    /// `name == name AND expire < now`: a lease nobody holds anymore.
    ExpiredBefore { name: String, now: DateTime<Utc> },
    /// `id == id AND expire > now`: this handle's lease, still valid.
    LiveById { id: LockId, now: DateTime<Utc> },
}

impl LockFilter {
    /// Reference semantics of the filter. Stores that cannot evaluate Rust
    /// predicates must translate these conditions exactly.
    pub fn matches(&self, record: &LockRecord) -> bool {
        match self {
            Self::ExpiredBefore { name, now } => record.name == *name && record.expire < *now,
            Self::LiveById { id, now } => record.id == *id && record.expire > *now,
        }
    }
}

/// Current time at the precision stores persist (milliseconds).
pub(crate) fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
