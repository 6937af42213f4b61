// src/network/registry.rs
use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceAddressEntry {
    pub device_id: String,
    pub network_address: IpAddr,
    pub last_seen: DateTime<Utc>,
}

impl DeviceAddressEntry {
    /// True when the entry is older than `max_age` at `now`.
    pub fn is_stale(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => now - self.last_seen > max_age,
            Err(_) => false,
        }
    }
}

/// Best-effort cache of the last address each device was seen at.
///
/// Entries are overwritten on every observation and never expire on their
/// own; callers decide whether an old address is still worth using.
#[derive(Default)]
pub struct DeviceRegistry {
    entries: DashMap<String, DeviceAddressEntry>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, device_id: &str, address: IpAddr, now: DateTime<Utc>) {
        let entry = DeviceAddressEntry {
            device_id: device_id.to_string(),
            network_address: address,
            last_seen: now,
        };
        if let Some(previous) = self.entries.insert(device_id.to_string(), entry) {
            if previous.network_address != address {
                debug!(
                    "Device {} moved from {} to {}",
                    device_id, previous.network_address, address
                );
            }
        }
    }

    pub fn resolve(&self, device_id: &str) -> Option<DeviceAddressEntry> {
        self.entries.get(device_id).map(|entry| entry.value().clone())
    }

    /// All known devices, most recently seen first.
    pub fn entries(&self) -> Vec<DeviceAddressEntry> {
        let mut entries: Vec<_> = self.entries.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
