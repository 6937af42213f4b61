// src/core/attendance/types.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One identity's attendance for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub identity_id: String,
    pub attendance_date: NaiveDate,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub last_device_id: String,
    /// Committed registrations for the day, the first one included.
    pub sightings: u32,
}

impl AttendanceRecord {
    pub fn new(identity_id: &str, attendance_date: NaiveDate, device_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            identity_id: identity_id.to_string(),
            attendance_date,
            first_seen: now,
            last_seen: now,
            last_device_id: device_id.to_string(),
            sightings: 1,
        }
    }

    pub fn touch(&mut self, device_id: &str, now: DateTime<Utc>) {
        if now > self.last_seen {
            self.last_seen = now;
        }
        self.last_device_id = device_id.to_string();
        self.sightings = self.sightings.saturating_add(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationOutcome {
    #[serde(rename = "new_registration")]
    NewRegistration,
    #[serde(rename = "cooldown_active")]
    AlreadyPresentCooldownActive,
    #[serde(rename = "updated")]
    AlreadyPresentUpdated,
}

impl RegistrationOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, RegistrationOutcome::NewRegistration)
    }
}
