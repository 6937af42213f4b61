// src/storage/attendance.rs
use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::StorageError;
use super::kv::KvStore;
use crate::core::attendance::{AttendanceRecord, AttendanceStore};

const ATTENDANCE_PREFIX: &str = "attendance";

/// RocksDB-backed attendance records keyed by `attendance:<date>:<identity>`.
pub struct RocksAttendanceStore {
    kv: KvStore,
}

impl RocksAttendanceStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    fn day_prefix(date: NaiveDate) -> String {
        format!("{}:{}:", ATTENDANCE_PREFIX, date.format("%Y-%m-%d"))
    }

    fn record_key(identity_id: &str, date: NaiveDate) -> String {
        format!("{}{}", Self::day_prefix(date), identity_id)
    }
}

#[async_trait]
impl AttendanceStore for RocksAttendanceStore {
    async fn fetch(&self, identity_id: &str, date: NaiveDate) -> Result<Option<AttendanceRecord>, StorageError> {
        self.kv.get(&Self::record_key(identity_id, date)).await
    }

    async fn commit(&self, record: &AttendanceRecord) -> Result<(), StorageError> {
        let key = Self::record_key(&record.identity_id, record.attendance_date);
        self.kv.store(&key, record).await
    }

    async fn list(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StorageError> {
        let entries = self.kv.scan_prefix(&Self::day_prefix(date)).await?;
        Ok(entries.into_iter().map(|(_, record)| record).collect())
    }
}
