// src/core/attendance/mod.rs
mod ledger;
mod store;
mod types;

pub use ledger::{AttendanceLedger, LedgerError};
pub use store::AttendanceStore;
pub use types::{AttendanceRecord, RegistrationOutcome};
