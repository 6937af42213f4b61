// src/api/handlers/devices.rs
use actix_web::{
    web::{self, Data, ServiceConfig},
    HttpResponse,
};

use crate::api::types::DevicesResponse;
use crate::network::DeviceRegistry;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(web::resource("/devices").route(web::get().to(list_devices)));
}

async fn list_devices(registry: Data<DeviceRegistry>) -> HttpResponse {
    let devices = registry.entries();
    HttpResponse::Ok().json(DevicesResponse {
        total: devices.len(),
        devices,
    })
}
