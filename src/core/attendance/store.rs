use async_trait::async_trait;
use chrono::NaiveDate;

use super::types::AttendanceRecord;
use crate::storage::StorageError;

/// Backing store for the attendance ledger.
///
/// `commit` must be atomic: after a failure the previous value for the key
/// is still the visible one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn fetch(&self, identity_id: &str, date: NaiveDate) -> Result<Option<AttendanceRecord>, StorageError>;

    async fn commit(&self, record: &AttendanceRecord) -> Result<(), StorageError>;

    async fn list(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StorageError>;
}
