//! `SQLite`-backed lock store.
//!
//! Any number of processes pointing at the same database file coordinate through
//! the `UNIQUE` constraint on `distributed_locks.name`. Timestamps are stored as
//! unix milliseconds so range comparisons stay numeric.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::LockStore;
use crate::error::{InsertError, StoreError};
use crate::record::{LockFilter, LockId, LockRecord, NewLockRecord};

type RecordRow = (String, String, i64, i64);

/// Lock records in a `SQLite` table.
///
/// The pool is owned by the caller's side of the world: clone it in, and the store
/// never closes it.
#[derive(Debug, Clone)]
pub struct SqliteLockStore {
    db: SqlitePool,
}

impl SqliteLockStore {
    /// Wrap an existing pool. Call [`Self::ensure_schema`] before first use unless
    /// the table is managed elsewhere.
    #[must_use]
    pub const fn from_pool(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Connect to `url` (e.g. `sqlite:///var/lib/app/locks.db`), creating the
    /// database file if missing, and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let db = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self::from_pool(db);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Private in-memory database. Limited to one connection, since every
    /// `:memory:` connection is a separate database.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self::from_pool(db);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Get the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Create the locks table and its uniqueness constraint. Idempotent.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS distributed_locks (
                lock_id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                expire_ms INTEGER NOT NULL,
                inserted_ms INTEGER NOT NULL
            )",
        )
        .execute(&self.db)
        .await
        .map_err(|e| StoreError::new(format!("Failed to initialize schema: {e}")))?;

        tracing::debug!("Lock schema ready");
        Ok(())
    }

    /// All records, expired ones included, ordered by name.
    pub async fn records(&self) -> Result<Vec<LockRecord>, StoreError> {
        let rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT lock_id, name, expire_ms, inserted_ms FROM distributed_locks ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(row_to_record).collect()
    }
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::new(format!("timestamp out of range: {ms}")))
}

fn row_to_record((id, name, expire_ms, inserted_ms): RecordRow) -> Result<LockRecord, StoreError> {
    Ok(LockRecord {
        id: LockId::new(id),
        name,
        expire: millis_to_datetime(expire_ms)?,
        inserted: millis_to_datetime(inserted_ms)?,
    })
}

#[async_trait::async_trait]
impl LockStore for SqliteLockStore {
    async fn remove_matching(
        &self,
        filter: &LockFilter,
    ) -> std::result::Result<Option<LockRecord>, StoreError> {
        // Single statement each, so find-and-delete is atomic.
        let row: Option<RecordRow> = match filter {
            LockFilter::ExpiredBefore { name, now } => {
                sqlx::query_as(
                    "DELETE FROM distributed_locks
                     WHERE lock_id = (
                         SELECT lock_id FROM distributed_locks
                         WHERE name = ? AND expire_ms < ?
                         LIMIT 1
                     )
                     RETURNING lock_id, name, expire_ms, inserted_ms",
                )
                .bind(name.as_str())
                .bind(now.timestamp_millis())
                .fetch_optional(&self.db)
                .await?
            }
            LockFilter::LiveById { id, now } => {
                sqlx::query_as(
                    "DELETE FROM distributed_locks
                     WHERE lock_id = ? AND expire_ms > ?
                     RETURNING lock_id, name, expire_ms, inserted_ms",
                )
                .bind(id.as_str())
                .bind(now.timestamp_millis())
                .fetch_optional(&self.db)
                .await?
            }
        };

        row.map(row_to_record).transpose()
    }

    async fn insert_unique(
        &self,
        record: &NewLockRecord,
    ) -> std::result::Result<LockId, InsertError> {
        let id = LockId::generate();

        let result = sqlx::query(
            "INSERT INTO distributed_locks (lock_id, name, expire_ms, inserted_ms) VALUES (?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(record.name.as_str())
        .bind(record.expire.timestamp_millis())
        .bind(record.inserted.timestamp_millis())
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(InsertError::DuplicateKey {
                    name: record.name.clone(),
                })
            }
            Err(e) => Err(InsertError::Store(StoreError::new(format!(
                "Failed to insert lock '{}': {e}",
                record.name
            )))),
        }
    }
}
