// tests/integration/ledger_tests.rs
use std::sync::Arc;
use std::time::Duration;

use attendance_node::{
    core::attendance::{AttendanceLedger, RegistrationOutcome},
    storage::{KvStore, RocksAttendanceStore},
};
use chrono::{FixedOffset, TimeZone, Utc};
use tempfile::tempdir;

fn ledger_at(path: &std::path::Path) -> AttendanceLedger {
    let store = RocksAttendanceStore::new(KvStore::open(path).unwrap());
    AttendanceLedger::new(
        Arc::new(store),
        Duration::from_secs(300),
        FixedOffset::east_opt(0).unwrap(),
        Duration::from_secs(2),
    )
}

#[tokio::test]
async fn test_concurrent_registrations_on_rocksdb() {
    let temp_dir = tempdir().unwrap();
    let ledger = Arc::new(ledger_at(temp_dir.path()));
    let now = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.register("7", &format!("pi-{}", i), now).await.unwrap()
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    let new = outcomes.iter().filter(|o| o.is_new()).count();
    assert_eq!(new, 1);
    assert!(outcomes
        .iter()
        .filter(|o| !o.is_new())
        .all(|o| *o == RegistrationOutcome::AlreadyPresentCooldownActive));

    let record = ledger.record("7", now.date_naive()).await.unwrap().unwrap();
    assert_eq!(record.sightings, 1);
}

#[tokio::test]
async fn test_attendance_survives_restart() {
    let temp_dir = tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();

    {
        let ledger = ledger_at(temp_dir.path());
        assert_eq!(
            ledger.register("7", "pi-101", now).await.unwrap(),
            RegistrationOutcome::NewRegistration
        );
    }

    // A fresh ledger over the same data still honours the cooldown.
    let ledger = ledger_at(temp_dir.path());
    assert_eq!(
        ledger
            .register("7", "pi-101", now + chrono::Duration::seconds(10))
            .await
            .unwrap(),
        RegistrationOutcome::AlreadyPresentCooldownActive
    );
}

#[tokio::test]
async fn test_day_listing_is_most_recent_first() {
    let temp_dir = tempdir().unwrap();
    let ledger = ledger_at(temp_dir.path());
    let t0 = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();

    ledger.register("1", "pi-101", t0).await.unwrap();
    ledger.register("2", "pi-101", t0 + chrono::Duration::minutes(1)).await.unwrap();
    ledger.register("3", "pi-102", t0 + chrono::Duration::minutes(2)).await.unwrap();
    ledger.register("1", "pi-102", t0 + chrono::Duration::minutes(10)).await.unwrap();

    let ids: Vec<_> = ledger
        .records_for(t0.date_naive())
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.identity_id)
        .collect();
    assert_eq!(ids, vec!["1", "3", "2"]);
}
