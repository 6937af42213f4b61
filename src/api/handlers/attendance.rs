// src/api/handlers/attendance.rs
use actix_web::{
    web::{self, Data, Json, ServiceConfig},
    HttpResponse,
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::api::types::{
    AttendanceDayResponse, AttendanceEntry, ErrorResponse, ManualRegistrationRequest, ManualRegistrationResponse,
};
use crate::core::attendance::AttendanceLedger;
use crate::core::gallery::GalleryStore;

/// Device id recorded for registrations made through the API.
pub const MANUAL_DEVICE_ID: &str = "manual";

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(web::resource("/attendance").route(web::post().to(register_manually)))
        .service(web::resource("/attendance/today").route(web::get().to(attendance_today)));
}

async fn attendance_today(
    ledger: Data<AttendanceLedger>,
    gallery: Data<GalleryStore>,
) -> Result<HttpResponse, actix_web::Error> {
    let date = ledger.attendance_date(Utc::now());
    let records = ledger.records_for(date).await.map_err(|e| {
        error!("Failed to list attendance for {}: {}", date, e);
        actix_web::error::InternalError::from_response(
            e.to_string(),
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string())),
        )
    })?;

    let gallery = gallery.current();
    let records: Vec<_> = records
        .into_iter()
        .map(|record| {
            let name = gallery.get(&record.identity_id).map(|r| r.display_name.clone());
            AttendanceEntry::new(record, name)
        })
        .collect();

    Ok(HttpResponse::Ok().json(AttendanceDayResponse {
        date,
        total: records.len(),
        records,
    }))
}

async fn register_manually(
    ledger: Data<AttendanceLedger>,
    gallery: Data<GalleryStore>,
    request: Json<ManualRegistrationRequest>,
) -> HttpResponse {
    let ManualRegistrationRequest {
        identity_id,
        device_id,
    } = request.into_inner();

    let Some(name) = gallery.current().get(&identity_id).map(|r| r.display_name.clone()) else {
        warn!("Manual registration for unknown identity {}", identity_id);
        return HttpResponse::NotFound().json(ErrorResponse::new(format!("Identity {} not found", identity_id)));
    };

    let device_id = device_id.unwrap_or_else(|| MANUAL_DEVICE_ID.to_string());
    match ledger.register(&identity_id, &device_id, Utc::now()).await {
        Ok(outcome) => {
            info!("Manual registration for {}: {:?}", identity_id, outcome);
            HttpResponse::Ok().json(ManualRegistrationResponse {
                success: true,
                identity_id,
                name,
                outcome,
            })
        }
        Err(e) => {
            error!("Manual registration for {} failed: {}", identity_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
    }
}
