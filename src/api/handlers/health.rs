// src/api/handlers/health.rs
use actix_web::{
    web::{self, Data, ServiceConfig},
    HttpResponse,
};
use chrono::Utc;

use crate::api::types::ServiceInfo;
use crate::core::services::HealthService;
use crate::utils::metrics::Metrics;

const ENDPOINTS: &[&str] = &[
    "POST /frame",
    "GET /identities",
    "GET /attendance/today",
    "POST /attendance",
    "POST /gallery/rebuild",
    "GET /devices",
    "GET /health",
    "GET /metrics",
];

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(service_info)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/metrics").route(web::get().to(metrics)));
}

async fn service_info() -> HttpResponse {
    HttpResponse::Ok().json(ServiceInfo {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
        endpoints: ENDPOINTS.to_vec(),
    })
}

async fn health(service: Data<HealthService>) -> HttpResponse {
    HttpResponse::Ok().json(service.report())
}

async fn metrics(metrics: Data<Metrics>) -> HttpResponse {
    HttpResponse::Ok().json(metrics.snapshot())
}
