// tests/integration/storage/attendance_store_tests.rs
use std::sync::Arc;

use attendance_node::{
    core::attendance::{AttendanceRecord, AttendanceStore},
    storage::{KvStore, RocksAttendanceStore},
};
use chrono::{TimeZone, Utc};
use tempfile::tempdir;

async fn setup_test_store() -> (RocksAttendanceStore, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let store = RocksAttendanceStore::new(KvStore::open(temp_dir.path()).unwrap());
    (store, temp_dir)
}

#[tokio::test]
async fn test_concurrent_access() {
    let (store, _temp_dir) = setup_test_store().await;
    let store = Arc::new(store);
    let now = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();

    let mut handles = Vec::new();
    // Spawn multiple tasks writing distinct identities for the same day
    for i in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let record = AttendanceRecord::new(&format!("student_{}", i), now.date_naive(), "pi-101", now);
            store.commit(&record).await.unwrap();
            store.fetch(&record.identity_id, now.date_naive()).await.unwrap()
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_some());
    }
    assert_eq!(store.list(now.date_naive()).await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_prefix_does_not_leak_into_neighbouring_days() {
    let (store, _temp_dir) = setup_test_store().await;
    let day = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).unwrap();
    let next = Utc.with_ymd_and_hms(2024, 3, 10, 0, 1, 0).unwrap();

    store
        .commit(&AttendanceRecord::new("1", day.date_naive(), "pi-101", day))
        .await
        .unwrap();
    store
        .commit(&AttendanceRecord::new("1", next.date_naive(), "pi-101", next))
        .await
        .unwrap();

    assert_eq!(store.list(day.date_naive()).await.unwrap().len(), 1);
    assert_eq!(store.list(next.date_naive()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reopen_reads_committed_records() {
    let temp_dir = tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
    let record = AttendanceRecord::new("7", now.date_naive(), "pi-101", now);

    {
        let store = RocksAttendanceStore::new(KvStore::open(temp_dir.path()).unwrap());
        store.commit(&record).await.unwrap();
    }

    let store = RocksAttendanceStore::new(KvStore::open(temp_dir.path()).unwrap());
    assert_eq!(store.fetch("7", now.date_naive()).await.unwrap(), Some(record));
}
