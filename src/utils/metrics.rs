// src/utils/metrics.rs
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::{Duration, Instant};

use crate::core::services::pipeline::FrameOutcome;

pub struct Metrics {
    start_time: Instant,
    frames_total: AtomicU64,
    frames_failed: AtomicU64,
    no_face: AtomicU64,
    unknown_faces: AtomicU64,
    recognized: AtomicU64,
    new_registrations: AtomicU64,
    feedback_sent: AtomicU64,
    feedback_failed: AtomicU64,
    processing_time: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_seconds: u64,
    pub frames_total: u64,
    pub frames_failed: u64,
    pub no_face: u64,
    pub unknown_faces: u64,
    pub recognized: u64,
    pub new_registrations: u64,
    pub feedback_sent: u64,
    pub feedback_failed: u64,
    pub avg_processing_micros: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            frames_total: AtomicU64::new(0),
            frames_failed: AtomicU64::new(0),
            no_face: AtomicU64::new(0),
            unknown_faces: AtomicU64::new(0),
            recognized: AtomicU64::new(0),
            new_registrations: AtomicU64::new(0),
            feedback_sent: AtomicU64::new(0),
            feedback_failed: AtomicU64::new(0),
            processing_time: AtomicU64::new(0),
        }
    }

    pub fn record_frame(&self, duration: Duration, outcome: Option<&FrameOutcome>) {
        self.frames_total.fetch_add(1, Ordering::SeqCst);
        self.processing_time.fetch_add(duration.as_micros() as u64, Ordering::SeqCst);

        match outcome {
            None => {
                self.frames_failed.fetch_add(1, Ordering::SeqCst);
            }
            Some(FrameOutcome::NoFaceDetected) => {
                self.no_face.fetch_add(1, Ordering::SeqCst);
            }
            Some(FrameOutcome::UnknownFace { .. }) => {
                self.unknown_faces.fetch_add(1, Ordering::SeqCst);
            }
            Some(FrameOutcome::Recognized { registered, .. }) => {
                self.recognized.fetch_add(1, Ordering::SeqCst);
                if *registered {
                    self.new_registrations.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
    }

    pub fn record_feedback(&self, success: bool) {
        if success {
            self.feedback_sent.fetch_add(1, Ordering::SeqCst);
        } else {
            self.feedback_failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_total.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let frames_total = self.frames_total.load(Ordering::SeqCst);
        let processing_time = self.processing_time.load(Ordering::SeqCst);

        MetricsSnapshot {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            frames_total,
            frames_failed: self.frames_failed.load(Ordering::SeqCst),
            no_face: self.no_face.load(Ordering::SeqCst),
            unknown_faces: self.unknown_faces.load(Ordering::SeqCst),
            recognized: self.recognized.load(Ordering::SeqCst),
            new_registrations: self.new_registrations.load(Ordering::SeqCst),
            feedback_sent: self.feedback_sent.load(Ordering::SeqCst),
            feedback_failed: self.feedback_failed.load(Ordering::SeqCst),
            avg_processing_micros: processing_time.checked_div(frames_total).unwrap_or(0),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
