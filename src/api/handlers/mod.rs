// src/api/handlers/mod.rs
pub mod attendance;
pub mod devices;
pub mod feedback;
pub mod frame;
pub mod gallery;
pub mod health;

use actix_web::{error::InternalError, error::JsonPayloadError, HttpRequest, HttpResponse};
use tracing::warn;

use super::types::ErrorResponse;

/// Malformed or oversized JSON bodies answer with the usual error shape.
pub fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected body on {}: {}", req.path(), err);
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string()));
    InternalError::from_response(err, response).into()
}
