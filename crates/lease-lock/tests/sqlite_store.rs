//! Lock lifecycle over SQLite, with separate pools standing in for separate processes

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use common::{handle, lock_config, NAME};
use lease_lock::{LockError, LockOptions, LockStore, SqliteLockStore};
use tempfile::TempDir;

fn shared_db() -> Result<(TempDir, String), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("locks.db").display());
    Ok((dir, url))
}

#[tokio::test]
async fn entry_stays_in_db_while_lock_is_held() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteLockStore::open_in_memory().await?;
    let mut lock = handle(Arc::new(store.clone()), NAME, lock_config());

    assert!(lock.acquire().await?);

    let acquired = lock.time_acquired().ok_or("no acquisition time")?;
    let records = store.records().await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, NAME);
    assert_eq!(records[0].inserted, acquired);
    assert_eq!(records[0].expire, acquired + ChronoDuration::milliseconds(500));
    Ok(())
}

#[tokio::test]
async fn entry_is_removed_on_release() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteLockStore::open_in_memory().await?;
    let mut lock = handle(Arc::new(store.clone()), NAME, lock_config());

    lock.acquire().await?;
    assert!(!lock.release().await?);
    assert!(store.records().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn expired_entries_are_replaced_on_reacquire() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteLockStore::open_in_memory().await?;
    let shared: Arc<dyn LockStore> = Arc::new(store.clone());
    let mut expired_lock = handle(
        shared.clone(),
        NAME,
        LockOptions::new().with_timeout(Duration::from_millis(100)),
    );
    let mut new_lock = handle(shared, NAME, lock_config());

    assert!(expired_lock.acquire().await?);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(new_lock.acquire().await?);

    let acquired = new_lock.time_acquired().ok_or("no acquisition time")?;
    let records = store.records().await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].inserted, acquired);
    assert_eq!(records[0].expire, acquired + ChronoDuration::milliseconds(500));
    assert_eq!(Some(&records[0].id), new_lock.lock_id());

    assert!(expired_lock.release().await?);
    assert_eq!(store.records().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn separate_pools_contend_through_the_unique_key() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, url) = shared_db()?;
    let process_a: Arc<dyn LockStore> = Arc::new(SqliteLockStore::connect(&url).await?);
    let process_b: Arc<dyn LockStore> = Arc::new(SqliteLockStore::connect(&url).await?);

    let mut a = handle(process_a, "job", lock_config());
    let mut b = handle(process_b, "job", lock_config());

    assert!(a.acquire().await?);
    assert!(!b.acquire().await?);
    assert!(!a.release().await?);
    assert!(b.acquire().await?);
    Ok(())
}

#[tokio::test]
async fn poll_across_pools_succeeds_after_release() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, url) = shared_db()?;
    let process_a: Arc<dyn LockStore> = Arc::new(SqliteLockStore::connect(&url).await?);
    let process_b: Arc<dyn LockStore> = Arc::new(SqliteLockStore::connect(&url).await?);

    let mut a = handle(process_a, "job", lock_config());
    let mut b = handle(process_b, "job", lock_config());
    assert!(a.acquire().await?);

    let releaser = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        a.release().await
    });

    assert!(b.poll_acquire().await?);
    assert!(!releaser.await??);
    Ok(())
}

#[tokio::test]
async fn poll_across_pools_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, url) = shared_db()?;
    let process_a: Arc<dyn LockStore> = Arc::new(SqliteLockStore::connect(&url).await?);
    let process_b: Arc<dyn LockStore> = Arc::new(SqliteLockStore::connect(&url).await?);

    let mut first = handle(
        process_a,
        NAME,
        LockOptions::new().with_timeout(Duration::from_secs(1)),
    );
    let mut second = handle(process_b, NAME, lock_config());
    assert!(first.acquire().await?);

    let result = second.poll_acquire().await;

    assert!(matches!(result, Err(LockError::PollTimeout { attempts: 7, .. })));
    Ok(())
}

#[tokio::test]
async fn schema_survives_reconnect() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, url) = shared_db()?;
    {
        let store = SqliteLockStore::connect(&url).await?;
        let mut lock = handle(Arc::new(store.clone()), NAME, lock_config());
        lock.acquire().await?;
        store.pool().close().await;
    }

    let reopened = SqliteLockStore::connect(&url).await?;
    assert_eq!(reopened.records().await?.len(), 1);
    Ok(())
}
