// src/api/handlers/gallery.rs
use actix_web::{
    web::{self, Data, ServiceConfig},
    HttpResponse,
};
use tracing::{error, info, warn};

use crate::api::types::{ErrorResponse, IdentitiesResponse, IdentitySummary, RebuildResponse};
use crate::core::gallery::{GalleryError, GalleryStore};
use crate::core::services::EnrollmentService;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(web::resource("/identities").route(web::get().to(list_identities)))
        .service(web::resource("/gallery/rebuild").route(web::post().to(rebuild_gallery)));
}

async fn list_identities(gallery: Data<GalleryStore>) -> HttpResponse {
    let gallery = gallery.current();
    let identities: Vec<_> = gallery
        .records()
        .iter()
        .map(|record| IdentitySummary {
            identity_id: record.identity_id.clone(),
            name: record.display_name.clone(),
        })
        .collect();

    HttpResponse::Ok().json(IdentitiesResponse {
        total: identities.len(),
        identities,
    })
}

async fn rebuild_gallery(enrollment: Data<EnrollmentService>) -> HttpResponse {
    info!("Gallery rebuild requested");

    match enrollment.rebuild_gallery().await {
        Ok(gallery) => HttpResponse::Ok().json(RebuildResponse {
            success: true,
            identity_count: gallery.len(),
        }),
        Err(e @ GalleryError::Build(_)) => {
            warn!("Gallery rebuild rejected: {}", e);
            HttpResponse::UnprocessableEntity().json(ErrorResponse::new(e.to_string()))
        }
        Err(e) => {
            error!("Gallery rebuild failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
    }
}
