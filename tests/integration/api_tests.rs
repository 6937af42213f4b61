// tests/integration/api_tests.rs
use std::net::SocketAddr;

use actix_web::{http::StatusCode, test, App};
use attendance_node::{api, core::recognition::Enrollment, core::recognition::Reference};
use serde_json::{json, Value};

use crate::common::{frame_payload, TestContext};

const MAX_BODY: usize = 10 * 1024 * 1024;

fn peer() -> SocketAddr {
    "192.168.1.20:40000".parse().unwrap()
}

macro_rules! init_app {
    ($ctx:expr) => {{
        let services = $ctx.app.services().clone();
        test::init_service(App::new().configure(move |cfg| api::configure(cfg, &services, MAX_BODY))).await
    }};
}

#[actix_rt::test]
async fn test_recognized_then_cooldown() {
    let mut ctx = TestContext::new().await;
    ctx.analyzer.set_faces(vec![vec![0.0, 0.0, 0.0]]);
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/frame")
        .peer_addr(peer())
        .insert_header(("X-Device-ID", "aula-1"))
        .set_json(json!({ "image": frame_payload() }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "recognized");
    assert_eq!(body["identity_id"], "1");
    assert_eq!(body["name"], "Ana Torres");
    assert_eq!(body["confidence"], 0.9);
    assert_eq!(body["registered"], true);
    assert_eq!(body["outcome"], "new_registration");

    let (address, _) = ctx.next_feedback().await.expect("feedback to the device");
    assert_eq!(address.ip().to_string(), "192.168.1.20");

    let req = test::TestRequest::post()
        .uri("/frame")
        .peer_addr(peer())
        .set_json(json!({ "image": frame_payload(), "device_id": "aula-1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "recognized");
    assert_eq!(body["registered"], false);
    assert_eq!(body["outcome"], "cooldown_active");
}

#[actix_rt::test]
async fn test_no_face_and_unknown_responses() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    ctx.analyzer.set_faces(vec![]);
    let req = test::TestRequest::post()
        .uri("/frame")
        .set_json(json!({ "image": frame_payload(), "device_id": "aula-1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "no_face");

    ctx.analyzer.set_faces(vec![vec![0.8, 0.0, 0.0]]);
    let req = test::TestRequest::post()
        .uri("/frame")
        .set_json(json!({ "image": frame_payload(), "device_id": "aula-1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "unknown");
    assert_eq!(body["faces_found"], 1);
}

#[actix_rt::test]
async fn test_frame_error_statuses() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/frame")
        .set_json(json!({ "image": "bm90IGFuIGltYWdl", "device_id": "aula-1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");

    let req = test::TestRequest::post()
        .uri("/frame")
        .set_json(json!({ "image": frame_payload() }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    ctx.analyzer.set_faces(vec![vec![0.1; 8]]);
    let req = test::TestRequest::post()
        .uri("/frame")
        .set_json(json!({ "image": frame_payload(), "device_id": "aula-1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::INTERNAL_SERVER_ERROR);

    ctx.analyzer.set_failing(true);
    let req = test::TestRequest::post()
        .uri("/frame")
        .set_json(json!({ "image": frame_payload(), "device_id": "aula-1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_rt::test]
async fn test_manual_registration_and_today_listing() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/attendance")
        .set_json(json!({ "identity_id": "2" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "Luis Vega");
    assert_eq!(body["outcome"], "new_registration");

    let req = test::TestRequest::post()
        .uri("/attendance")
        .set_json(json!({ "identity_id": "404" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/attendance/today").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["records"][0]["identity_id"], "2");
    assert_eq!(body["records"][0]["name"], "Luis Vega");
    assert_eq!(body["records"][0]["last_device_id"], "manual");
}

#[actix_rt::test]
async fn test_identities_health_and_devices() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/identities").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["identities"][0]["identity_id"], "1");

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["gallery_loaded"], true);
    assert_eq!(body["identity_count"], 2);

    ctx.analyzer.set_faces(vec![]);
    let req = test::TestRequest::post()
        .uri("/frame")
        .peer_addr(peer())
        .set_json(json!({ "image": frame_payload(), "device_id": "aula-7" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/devices").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["devices"][0]["device_id"], "aula-7");

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["frames_processed"], 1);
}

#[actix_rt::test]
async fn test_gallery_rebuild_endpoint() {
    let ctx = TestContext::with_enrollments(vec![Enrollment {
        identity_id: "9".into(),
        name: "Marta Ruiz".into(),
        reference: Reference::Vector(vec![0.4, 0.4, 0.4]),
    }])
    .await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post().uri("/gallery/rebuild").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["identity_count"], 1);

    let req = test::TestRequest::get().uri("/identities").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["identities"][0]["name"], "Marta Ruiz");
}

#[actix_rt::test]
async fn test_rejected_rebuild_keeps_gallery() {
    let ctx = TestContext::with_enrollments(vec![Enrollment {
        identity_id: "9".into(),
        name: "Sin vector".into(),
        reference: Reference::Vector(vec![]),
    }])
    .await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post().uri("/gallery/rebuild").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get().uri("/identities").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 2);
}

#[actix_rt::test]
async fn test_rejected_body_still_records_device_address() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/frame")
        .peer_addr(peer())
        .insert_header(("X-Device-ID", "aula-3"))
        .set_json(json!({ "device_id": "aula-3" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");

    let entry = ctx.app.services().registry.resolve("aula-3").expect("device observed");
    assert_eq!(entry.network_address.to_string(), "192.168.1.20");
}
