// src/core/actuator.rs
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::info;

use crate::network::SignalKind;

/// What a device is currently showing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActuatorState {
    pub active: Option<SignalKind>,
    pub until: Option<DateTime<Utc>>,
}

/// Physical output on a device (LEDs, buzzer).
///
/// `activate` returns once the signal is on; the signal turns itself off after
/// `duration` unless replaced or cleared first.
#[async_trait]
pub trait SignalActuator: Send + Sync {
    async fn activate(&self, signal: SignalKind, duration: Duration);
    async fn clear(&self);
    fn state(&self) -> ActuatorState;
}

#[derive(Default)]
struct Inner {
    state: Option<(SignalKind, DateTime<Utc>)>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Actuator that only logs transitions. Used where no GPIO is attached.
#[derive(Default, Clone)]
pub struct LoggingActuator {
    inner: Arc<Mutex<Inner>>,
}

impl LoggingActuator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignalActuator for LoggingActuator {
    async fn activate(&self, signal: SignalKind, duration: Duration) {
        let until = Utc::now() + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::seconds(10));

        let mut inner = self.inner.lock();
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.generation += 1;
        inner.state = Some((signal, until));
        let generation = inner.generation;
        info!("Signal {} on for {:?}", signal, duration);

        let shared = self.inner.clone();
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut inner = shared.lock();
            // A newer signal owns the output now.
            if inner.generation == generation {
                inner.state = None;
                inner.timer = None;
                info!("Signal {} off", signal);
            }
        }));
    }

    async fn clear(&self) {
        let mut inner = self.inner.lock();
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.generation += 1;
        if let Some((signal, _)) = inner.state.take() {
            info!("Signal {} cleared", signal);
        }
    }

    fn state(&self) -> ActuatorState {
        let inner = self.inner.lock();
        ActuatorState {
            active: inner.state.map(|(signal, _)| signal),
            until: inner.state.map(|(_, until)| until),
        }
    }
}
