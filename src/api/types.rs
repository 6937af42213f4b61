// src/api/types.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::attendance::{AttendanceRecord, RegistrationOutcome};
use crate::core::services::FrameOutcome;
use crate::network::{DeviceAddressEntry, SignalKind};

#[derive(Debug, Deserialize)]
pub struct FrameRequest {
    pub image: String,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Wire form of a frame result, tagged by `status`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameResponse {
    NoFace {
        message: String,
    },
    Unknown {
        message: String,
        faces_found: usize,
    },
    Recognized {
        identity_id: String,
        name: String,
        confidence: f32,
        registered: bool,
        outcome: RegistrationOutcome,
    },
    Error {
        message: String,
    },
}

impl FrameResponse {
    pub fn error(message: impl Into<String>) -> Self {
        FrameResponse::Error {
            message: message.into(),
        }
    }
}

impl From<FrameOutcome> for FrameResponse {
    fn from(outcome: FrameOutcome) -> Self {
        match outcome {
            FrameOutcome::NoFaceDetected => FrameResponse::NoFace {
                message: "No face detected".to_string(),
            },
            FrameOutcome::UnknownFace { faces_found } => FrameResponse::Unknown {
                message: "Face not recognized".to_string(),
                faces_found,
            },
            FrameOutcome::Recognized {
                identity_id,
                name,
                confidence,
                registered,
                outcome,
            } => FrameResponse::Recognized {
                identity_id,
                name,
                // Two decimals are plenty for display.
                confidence: (confidence * 100.0).round() / 100.0,
                registered,
                outcome,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IdentitySummary {
    pub identity_id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct IdentitiesResponse {
    pub total: usize,
    pub identities: Vec<IdentitySummary>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceEntry {
    pub identity_id: String,
    pub name: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub last_device_id: String,
    pub sightings: u32,
}

impl AttendanceEntry {
    pub fn new(record: AttendanceRecord, name: Option<String>) -> Self {
        Self {
            identity_id: record.identity_id,
            name,
            first_seen: record.first_seen,
            last_seen: record.last_seen,
            last_device_id: record.last_device_id,
            sightings: record.sightings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceDayResponse {
    pub date: NaiveDate,
    pub total: usize,
    pub records: Vec<AttendanceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ManualRegistrationRequest {
    pub identity_id: String,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ManualRegistrationResponse {
    pub success: bool,
    pub identity_id: String,
    pub name: String,
    pub outcome: RegistrationOutcome,
}

#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub success: bool,
    pub identity_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub endpoints: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub total: usize,
    pub devices: Vec<DeviceAddressEntry>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackAccepted {
    pub success: bool,
    pub signal: SignalKind,
    pub duration_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct AgentError {
    pub error: String,
}
