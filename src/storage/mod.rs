// src/storage/mod.rs
pub mod attendance;
pub mod error;
pub mod kv;

pub use attendance::RocksAttendanceStore;
pub use error::StorageError;
pub use kv::KvStore;
