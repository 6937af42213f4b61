// src/api/handlers/frame.rs
use actix_web::{
    http::StatusCode,
    web::{self, Data, Json, ServiceConfig},
    HttpRequest, HttpResponse,
};
use chrono::Utc;
use tracing::{error, warn};

use crate::api::types::{FrameRequest, FrameResponse};
use crate::core::services::{FrameError, FramePipeline, FrameSubmission};
use crate::network::DeviceRegistry;

pub const DEVICE_ID_HEADER: &str = "X-Device-ID";

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(web::resource("/frame").route(web::post().to(submit_frame)));
}

async fn submit_frame(
    req: HttpRequest,
    pipeline: Data<FramePipeline>,
    registry: Data<DeviceRegistry>,
    request: Result<Json<FrameRequest>, actix_web::Error>,
) -> HttpResponse {
    let header_id = req
        .headers()
        .get(DEVICE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    let FrameRequest { image, device_id } = match request {
        Ok(request) => request.into_inner(),
        Err(e) => {
            // A device that sent a bad body can still be signalled later.
            if let (Some(device_id), Some(peer)) = (&header_id, req.peer_addr()) {
                registry.observe(device_id, peer.ip(), Utc::now());
            }
            return e.error_response();
        }
    };

    let Some(device_id) = header_id.or(device_id.filter(|id| !id.trim().is_empty())) else {
        warn!("Frame without device id from {:?}", req.peer_addr());
        return HttpResponse::BadRequest().json(FrameResponse::error("device_id is required"));
    };

    let submission = FrameSubmission {
        image,
        device_id,
        source: req.peer_addr().map(|addr| addr.ip()),
    };

    match pipeline.handle_frame(submission, Utc::now()).await {
        Ok(outcome) => HttpResponse::Ok().json(FrameResponse::from(outcome)),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!("Frame processing failed: {}", e);
            }
            HttpResponse::build(status).json(FrameResponse::error(e.to_string()))
        }
    }
}

fn status_for(error: &FrameError) -> StatusCode {
    match error {
        FrameError::InvalidImage(_) => StatusCode::BAD_REQUEST,
        FrameError::Dimension(_) | FrameError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        FrameError::Recognition(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
