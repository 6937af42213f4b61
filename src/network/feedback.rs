// src/network/feedback.rs
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::registry::DeviceRegistry;
use super::transport::FeedbackTransport;

/// Longest signal a device will accept, in seconds.
pub const MAX_SIGNAL_SECONDS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Positive,
    Negative,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Positive => write!(f, "positive"),
            SignalKind::Negative => write!(f, "negative"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("duration must be in (0, {}] seconds, got {0}", MAX_SIGNAL_SECONDS)]
    InvalidDuration(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackCommand {
    pub signal: SignalKind,
    pub duration_seconds: f64,
}

impl FeedbackCommand {
    pub fn new(signal: SignalKind, duration: Duration) -> Self {
        Self {
            signal,
            duration_seconds: duration.as_secs_f64(),
        }
    }

    /// Durations outside `(0, 10]` are rejected, never clamped.
    pub fn validate(&self) -> Result<(), CommandError> {
        let d = self.duration_seconds;
        if d.is_finite() && d > 0.0 && d <= MAX_SIGNAL_SECONDS {
            Ok(())
        } else {
            Err(CommandError::InvalidDuration(d))
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_seconds).unwrap_or(Duration::ZERO)
    }
}

/// Acknowledgement from a device that accepted a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    pub device_id: String,
    pub status: u16,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    #[error("No known address for device {0}")]
    UnknownDevice(String),

    #[error("Device unreachable: {0}")]
    Unreachable(String),

    #[error("Device rejected command with HTTP {status}")]
    Rejected { status: u16 },
}

/// Sends feedback commands to devices at the address the registry last saw
/// them at.
pub struct FeedbackDispatcher {
    registry: Arc<DeviceRegistry>,
    transport: Arc<dyn FeedbackTransport>,
    device_port: u16,
    timeout: Duration,
}

impl FeedbackDispatcher {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        transport: Arc<dyn FeedbackTransport>,
        device_port: u16,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            transport,
            device_port,
            timeout,
        }
    }

    pub async fn send_signal(
        &self,
        device_id: &str,
        signal: SignalKind,
        duration: Duration,
    ) -> Result<Ack, DispatchError> {
        let entry = self
            .registry
            .resolve(device_id)
            .ok_or_else(|| DispatchError::UnknownDevice(device_id.to_string()))?;

        let address = SocketAddr::new(entry.network_address, self.device_port);
        let command = FeedbackCommand::new(signal, duration);
        debug!("Sending {} signal to {} at {}", signal, device_id, address);

        let status = match tokio::time::timeout(self.timeout, self.transport.send(address, &command)).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                warn!("Feedback to {} failed: {}", device_id, e);
                return Err(e);
            }
            Err(_) => {
                warn!("Feedback to {} timed out after {:?}", device_id, self.timeout);
                return Err(DispatchError::Unreachable(format!(
                    "timed out after {:?}",
                    self.timeout
                )));
            }
        };

        Ok(Ack {
            device_id: device_id.to_string(),
            status,
        })
    }
}
