// src/utils/monitoring.rs
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::utils::metrics::Metrics;

pub struct Monitor {
    metrics: Arc<Metrics>,
    log_interval: Duration,
}

impl Monitor {
    pub fn new(metrics: Arc<Metrics>, log_interval: Duration) -> Self {
        Self {
            metrics,
            log_interval,
        }
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.log_interval);
            // First tick fires immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.log_metrics();
            }
        })
    }

    fn log_metrics(&self) {
        let snapshot = self.metrics.snapshot();
        tracing::info!(
            total_frames = snapshot.frames_total,
            failed_frames = snapshot.frames_failed,
            recognized = snapshot.recognized,
            unknown = snapshot.unknown_faces,
            new_registrations = snapshot.new_registrations,
            feedback_failed = snapshot.feedback_failed,
            avg_process_micros = snapshot.avg_processing_micros,
            "System metrics"
        );
    }
}
