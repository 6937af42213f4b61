// src/core/services/health.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::gallery::GalleryStore;
use crate::utils::metrics::Metrics;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub gallery_loaded: bool,
    pub identity_count: usize,
    pub uptime_seconds: u64,
    pub frames_processed: u64,
}

pub struct HealthService {
    gallery: Arc<GalleryStore>,
    metrics: Arc<Metrics>,
}

impl HealthService {
    pub fn new(gallery: Arc<GalleryStore>, metrics: Arc<Metrics>) -> Self {
        Self { gallery, metrics }
    }

    pub fn report(&self) -> HealthReport {
        let gallery = self.gallery.current();
        let snapshot = self.metrics.snapshot();

        HealthReport {
            // An empty gallery can only ever answer "unknown".
            status: if gallery.is_empty() { "degraded" } else { "ok" },
            timestamp: Utc::now(),
            gallery_loaded: !gallery.is_empty(),
            identity_count: gallery.len(),
            uptime_seconds: snapshot.uptime_seconds,
            frames_processed: self.metrics.frames_processed(),
        }
    }
}
