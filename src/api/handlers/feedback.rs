// src/api/handlers/feedback.rs
//! Routes served by the feedback agent running on each device.
use actix_web::{
    web::{self, Data, Json, ServiceConfig},
    HttpResponse,
};
use tracing::{info, warn};

use crate::api::types::{AgentError, FeedbackAccepted};
use crate::core::actuator::SignalActuator;
use crate::network::FeedbackCommand;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(web::resource("/feedback").route(web::post().to(accept_feedback)))
        .service(web::resource("/feedback/off").route(web::post().to(clear_feedback)))
        .service(web::resource("/status").route(web::get().to(status)));
}

async fn accept_feedback(actuator: Data<dyn SignalActuator>, command: Json<FeedbackCommand>) -> HttpResponse {
    let command = command.into_inner();
    if let Err(e) = command.validate() {
        warn!("Rejected feedback command: {}", e);
        return HttpResponse::BadRequest().json(AgentError { error: e.to_string() });
    }

    info!("Feedback {} for {}s", command.signal, command.duration_seconds);
    actuator.activate(command.signal, command.duration()).await;

    HttpResponse::Ok().json(FeedbackAccepted {
        success: true,
        signal: command.signal,
        duration_seconds: command.duration_seconds,
    })
}

async fn clear_feedback(actuator: Data<dyn SignalActuator>) -> HttpResponse {
    actuator.clear().await;
    HttpResponse::Ok().json(actuator.state())
}

async fn status(actuator: Data<dyn SignalActuator>) -> HttpResponse {
    HttpResponse::Ok().json(actuator.state())
}
