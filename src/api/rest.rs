// src/api/rest.rs
use std::sync::Arc;

use actix_web::web::{self, Data, ServiceConfig};

use super::handlers;
use crate::core::attendance::AttendanceLedger;
use crate::core::gallery::GalleryStore;
use crate::core::services::{EnrollmentService, FramePipeline, HealthService};
use crate::network::DeviceRegistry;
use crate::utils::metrics::Metrics;

/// Shared services the node's HTTP handlers draw on.
#[derive(Clone)]
pub struct ApiServices {
    pub pipeline: Arc<FramePipeline>,
    pub gallery: Arc<GalleryStore>,
    pub ledger: Arc<AttendanceLedger>,
    pub registry: Arc<DeviceRegistry>,
    pub enrollment: Arc<EnrollmentService>,
    pub health: Arc<HealthService>,
    pub metrics: Arc<Metrics>,
}

/// Registers every node route and its shared state on an actix `App`.
pub fn configure(cfg: &mut ServiceConfig, services: &ApiServices, max_request_bytes: usize) {
    cfg.app_data(web::JsonConfig::default().limit(max_request_bytes).error_handler(handlers::json_error))
        .app_data(Data::from(services.pipeline.clone()))
        .app_data(Data::from(services.gallery.clone()))
        .app_data(Data::from(services.ledger.clone()))
        .app_data(Data::from(services.registry.clone()))
        .app_data(Data::from(services.enrollment.clone()))
        .app_data(Data::from(services.health.clone()))
        .app_data(Data::from(services.metrics.clone()))
        .configure(handlers::health::configure)
        .configure(handlers::frame::configure)
        .configure(handlers::attendance::configure)
        .configure(handlers::gallery::configure)
        .configure(handlers::devices::configure);
}
