use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::Mutex as SyncMutex;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use super::store::AttendanceStore;
use super::types::{AttendanceRecord, RegistrationOutcome};
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),
}

type LockKey = (String, NaiveDate);

/// Per-day attendance state with cooldown deduplication.
///
/// Registrations for the same `(identity, date)` are serialized through an
/// in-process async mutex so two concurrent frames can never both observe an
/// absent record. Distinct keys never contend.
///
/// A commit that outlives the storage timeout keeps its key locked until the
/// write settles. If it lands, its outcome goes to the next caller for that
/// key instead of being lost.
pub struct AttendanceLedger {
    store: Arc<dyn AttendanceStore>,
    cooldown: chrono::Duration,
    offset: FixedOffset,
    storage_timeout: Duration,
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
    unreported: Arc<DashMap<LockKey, RegistrationOutcome>>,
    pruned_through: SyncMutex<Option<NaiveDate>>,
}

impl AttendanceLedger {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        cooldown: Duration,
        offset: FixedOffset,
        storage_timeout: Duration,
    ) -> Self {
        // Anything longer than a day already means once per day.
        let cooldown = chrono::Duration::from_std(cooldown).unwrap_or_else(|_| chrono::Duration::days(1));
        Self {
            store,
            cooldown,
            offset,
            storage_timeout,
            locks: DashMap::new(),
            unreported: Arc::new(DashMap::new()),
            pruned_through: SyncMutex::new(None),
        }
    }

    /// Calendar date of `now` in the ledger's configured offset.
    pub fn attendance_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    pub async fn register(
        &self,
        identity_id: &str,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<RegistrationOutcome, LedgerError> {
        let date = self.attendance_date(now);
        self.prune_locks(date);

        let key = (identity_id.to_string(), date);
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;

        if let Some((_, outcome)) = self.unreported.remove(&key) {
            info!(
                "Attendance {:?} for {} on {} committed late, reporting it now",
                outcome, identity_id, date
            );
            return Ok(outcome);
        }

        let existing = self
            .with_timeout(self.store.fetch(identity_id, date))
            .await
            .map_err(|e| {
                error!("Failed to read attendance for {} on {}: {}", identity_id, date, e);
                e
            })?;

        let (record, outcome) = match existing {
            None => (
                AttendanceRecord::new(identity_id, date, device_id, now),
                RegistrationOutcome::NewRegistration,
            ),
            Some(record) if now - record.last_seen < self.cooldown => {
                debug!(
                    "Cooldown active for {} (last seen {})",
                    identity_id, record.last_seen
                );
                return Ok(RegistrationOutcome::AlreadyPresentCooldownActive);
            }
            Some(mut record) => {
                record.touch(device_id, now);
                (record, RegistrationOutcome::AlreadyPresentUpdated)
            }
        };

        self.commit(key, record, outcome, guard)
            .await
            .map_err(|e| {
                error!("Failed to commit attendance for {} on {}: {}", identity_id, date, e);
                e
            })?;

        info!(
            "Attendance {:?} for {} on {} via {}",
            outcome, identity_id, date, device_id
        );
        Ok(outcome)
    }

    pub async fn record(
        &self,
        identity_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, LedgerError> {
        self.with_timeout(self.store.fetch(identity_id, date)).await
    }

    /// Records for `date`, most recently seen first.
    pub async fn records_for(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, LedgerError> {
        let mut records = self.with_timeout(self.store.list(date)).await?;
        records.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        Ok(records)
    }

    async fn commit(
        &self,
        key: LockKey,
        record: AttendanceRecord,
        outcome: RegistrationOutcome,
        guard: OwnedMutexGuard<()>,
    ) -> Result<(), LedgerError> {
        let store = self.store.clone();
        let mut write = tokio::spawn(async move {
            let result = store.commit(&record).await;
            (result, guard)
        });

        match tokio::time::timeout(self.storage_timeout, &mut write).await {
            Ok(Ok((result, _guard))) => Ok(result?),
            Ok(Err(e)) => Err(StorageError::TaskFailed(e.to_string()).into()),
            Err(_) => {
                let unreported = self.unreported.clone();
                tokio::spawn(async move {
                    // The key stays locked until the outcome is parked.
                    if let Ok((Ok(()), _guard)) = write.await {
                        warn!("Attendance for {} on {} landed after its timeout", key.0, key.1);
                        unreported.insert(key, outcome);
                    }
                });
                Err(StorageError::Timeout(self.storage_timeout).into())
            }
        }
    }

    async fn with_timeout<T, F>(&self, operation: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match tokio::time::timeout(self.storage_timeout, operation).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StorageError::Timeout(self.storage_timeout).into()),
        }
    }

    // Drops lock entries of past days that nobody is holding.
    fn prune_locks(&self, today: NaiveDate) {
        let mut pruned_through = self.pruned_through.lock();
        if let Some(date) = *pruned_through {
            if date >= today {
                return;
            }
        }
        self.locks
            .retain(|(_, date), lock| *date >= today || Arc::strong_count(lock) > 1);
        self.unreported.retain(|(_, date), _| *date >= today);
        *pruned_through = Some(today);
    }
}
