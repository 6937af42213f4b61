use std::path::Path;
use std::sync::Arc;

use rocksdb::{Direction, IteratorMode, Options, WriteOptions, DB};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use super::error::{Result, StorageError};

/// JSON-valued RocksDB store. Every write is synced before it returns.
#[derive(Clone)]
pub struct KvStore {
    db: Arc<DB>,
}

impl KvStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create directory if it doesn't exist
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_keep_log_file_num(10);
        opts.set_max_open_files(1000);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DB::open(&opts, path)
            .map_err(|e| StorageError::DatabaseError(format!("Failed to open database: {}", e)))?;

        info!("Opened key-value store at {:?}", path);
        Ok(Self { db: Arc::new(db) })
    }

    pub async fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let serialized = serde_json::to_vec(value)
            .map_err(|e| StorageError::InvalidFormat(format!("Serialization failed: {}", e)))?;
        let key = key.to_owned();

        self.blocking(move |db| {
            db.put_opt(key.as_bytes(), serialized, &synced())
                .map_err(|e| StorageError::DatabaseError(format!("Database write failed: {}", e)))
        })
        .await
    }

    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let key = key.to_owned();

        self.blocking(move |db| {
            let raw = match db
                .get(key.as_bytes())
                .map_err(|e| StorageError::DatabaseError(format!("Database read failed: {}", e)))?
            {
                Some(data) => data,
                None => return Ok(None),
            };

            let value = serde_json::from_slice(&raw)
                .map_err(|e| StorageError::InvalidFormat(format!("Deserialization failed: {}", e)))?;
            Ok(Some(value))
        })
        .await
    }

    /// Returns every `(key, value)` whose key starts with `prefix`, in key order.
    pub async fn scan_prefix<T: DeserializeOwned + Send + 'static>(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, T)>> {
        let prefix = prefix.to_owned();

        self.blocking(move |db| {
            let mut entries = Vec::new();
            let iter = db.iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward));

            for item in iter {
                let (key, raw) =
                    item.map_err(|e| StorageError::DatabaseError(format!("Scan failed: {}", e)))?;
                if !key.starts_with(prefix.as_bytes()) {
                    break;
                }

                let key = String::from_utf8(key.to_vec())
                    .map_err(|e| StorageError::InvalidFormat(format!("Non UTF-8 key: {}", e)))?;
                let value = serde_json::from_slice(&raw).map_err(|e| {
                    StorageError::InvalidFormat(format!("Deserialization of {} failed: {}", key, e))
                })?;
                entries.push((key, value));
            }

            Ok(entries)
        })
        .await
    }

    async fn blocking<F, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&DB) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || operation(&db))
            .await
            .map_err(|e| StorageError::TaskFailed(e.to_string()))?
    }
}

fn synced() -> WriteOptions {
    let mut opts = WriteOptions::default();
    opts.set_sync(true);
    opts
}
