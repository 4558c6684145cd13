mod common;

use actix_web::{App, http::StatusCode, test, web::Data};
use attendance_hub::attendance::ingest::SHEET_NAME;
use attendance_hub::backend::AttendanceBackend;
use attendance_hub::config::Config;
use attendance_hub::routes;
use common::{EXPIRED_TOKEN_USER, FakeBackend, exception_report, start_backend, token};
use serde_json::{Value, json};

macro_rules! init_app {
    ($config:expr) => {{
        let config: Config = $config;
        let backend = AttendanceBackend::from_config(&config).unwrap();
        let route_config = config.clone();
        test::init_service(
            App::new()
                .app_data(Data::new(config))
                .app_data(Data::new(backend))
                .configure(move |cfg| routes::configure(cfg, route_config.clone())),
        )
        .await
    }};
}

fn peer() -> std::net::SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn get(uri: &str, token: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
}

fn post(uri: &str, token: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
}

fn persisted_row(name: &str, fecha: &str, entrada: Option<&str>) -> Value {
    json!({
        "id_registro": 1,
        "registrado_por": "RRHH",
        "area": "Ventas",
        "pdf_reporte": "http://files.local/1.xlsx",
        "nombre": name,
        "fecha": fecha,
        "hora_entrada": entrada,
        "hora_salida": "18:00:00",
        "anio": 2024,
        "mes": 3
    })
}

#[actix_web::test]
async fn requests_without_token_are_rejected() {
    let (url, handle) = start_backend(FakeBackend::default()).await;
    let app = init_app!(common::config(&url));

    let req = test::TestRequest::get().uri("/api/attendance").peer_addr(peer()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    handle.stop(false).await;
}

#[actix_web::test]
async fn upload_review_and_save() {
    let fake = FakeBackend::with_rows(vec![persisted_row("Luis Ramos", "2024-03-01", Some("09:05:00"))]);
    let (url, handle) = start_backend(fake.clone()).await;
    let app = init_app!(common::config(&url));
    let hr = token(101, "rrhh", 2);

    // persisted rows
    let resp = test::call_service(&app, post("/api/attendance/refresh", &hr).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // upload
    let workbook = exception_report(
        SHEET_NAME,
        &[
            ("3", "Ana Torres", "2024-03-04", Some("08:45:00"), Some("19:10:00")),
            ("3", "Ana Torres", "2024-03-05", Some("09:20:00"), Some("18:30:00")),
            // Sunday
            ("3", "Ana Torres", "2024-03-10", None, None),
        ],
    );
    let req = post("/api/attendance/upload", &hr)
        .insert_header(("Content-Type", "application/octet-stream"))
        .set_payload(workbook)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 3);

    // review: ingested rows first, Sunday hidden from the table only
    let body: Value = test::call_and_read_body_json(&app, get("/api/attendance?name=Ana%20Torres", &hr).to_request()).await;
    assert_eq!(body["summary"]["on_time_count"], 1);
    assert_eq!(body["summary"]["late_count"], 1);
    assert_eq!(body["summary"]["absent_count"], 1);
    assert_eq!(body["summary"]["total_owed_minutes"], 15);
    assert_eq!(body["summary"]["total_tardiness_minutes"], 20);
    assert_eq!(body["summary"]["total_overtime_minutes"], 70);
    assert_eq!(body["summary"]["net_owed_or_extra_minutes"], 65);
    assert_eq!(body["table"]["total"], 2);
    assert_eq!(body["options"]["names"], json!(["Ana Torres", "Luis Ramos"]));
    assert_eq!(body["pending_records"], 3);

    // save
    let req = post("/api/attendance/save", &hr)
        .set_json(json!({"registrado_por": "RRHH", "area": "Ventas"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["report"]["id"], 41);
    assert_eq!(body["report"]["document_url"], "http://files.local/41.xlsx");
    assert_eq!(body["dashboard"]["pending_records"], 0);

    let uploads = fake.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].contains("name=\"pdf_reporte\""));
    assert!(uploads[0].contains("name=\"registrado_por\""));

    // the backend now holds the saved rows; they come back through the refresh
    let body: Value = test::call_and_read_body_json(&app, get("/api/attendance", &hr).to_request()).await;
    assert_eq!(body["summary"]["on_time_count"], 1);
    assert_eq!(body["summary"]["late_count"], 2);

    let body: Value = test::call_and_read_body_json(&app, get("/api/attendance/history", &hr).to_request()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["record_count"], 3);

    handle.stop(false).await;
}

#[actix_web::test]
async fn missing_sheet_leaves_session_untouched() {
    let (url, handle) = start_backend(FakeBackend::default()).await;
    let app = init_app!(common::config(&url));
    let hr = token(102, "rrhh", 2);

    let good = exception_report(SHEET_NAME, &[("1", "Ana", "2024-03-04", Some("08:00:00"), None)]);
    let req = post("/api/attendance/upload", &hr).set_payload(good).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let wrong = exception_report("Hoja1", &[("2", "Luis", "2024-03-04", Some("08:00:00"), None)]);
    let req = post("/api/attendance/upload", &hr).set_payload(wrong).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "sheet_not_found");

    let empty = exception_report(SHEET_NAME, &[("2", "Luis", "???", None, None)]);
    let req = post("/api/attendance/upload", &hr).set_payload(empty).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["error"], "empty_result");

    let body: Value = test::call_and_read_body_json(&app, get("/api/attendance", &hr).to_request()).await;
    assert_eq!(body["pending_records"], 1);
    assert_eq!(body["options"]["names"], json!(["Ana"]));

    handle.stop(false).await;
}

#[actix_web::test]
async fn failed_save_keeps_pending_records() {
    let fake = FakeBackend::default();
    *fake.fail_persist.lock().unwrap() = true;
    let (url, handle) = start_backend(fake).await;
    let app = init_app!(common::config(&url));
    let hr = token(103, "rrhh", 2);

    let workbook = exception_report(SHEET_NAME, &[("1", "Ana", "2024-03-04", Some("08:00:00"), None)]);
    let req = post("/api/attendance/upload", &hr).set_payload(workbook).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = post("/api/attendance/save", &hr)
        .set_json(json!({"registrado_por": "RRHH", "area": "Ventas"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_GATEWAY);

    let body: Value = test::call_and_read_body_json(&app, get("/api/attendance", &hr).to_request()).await;
    assert_eq!(body["pending_records"], 1);

    let body: Value = test::call_and_read_body_json(&app, get("/api/attendance/history", &hr).to_request()).await;
    assert_eq!(body, json!([]));

    handle.stop(false).await;
}

#[actix_web::test]
async fn upload_during_a_save_is_kept() {
    let fake = FakeBackend::default();
    *fake.persist_delay_ms.lock().unwrap() = 300;
    let (url, handle) = start_backend(fake.clone()).await;
    let app = init_app!(common::config(&url));
    let hr = token(108, "rrhh", 2);

    let first = exception_report(SHEET_NAME, &[("1", "Ana", "2024-03-04", Some("08:00:00"), None)]);
    let req = post("/api/attendance/upload", &hr).set_payload(first).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let second = exception_report(
        SHEET_NAME,
        &[
            ("2", "Luis", "2024-03-05", Some("08:30:00"), None),
            ("2", "Luis", "2024-03-06", Some("09:10:00"), None),
        ],
    );
    let save = post("/api/attendance/save", &hr)
        .set_json(json!({"registrado_por": "RRHH", "area": "Ventas"}))
        .to_request();
    let upload = post("/api/attendance/upload", &hr).set_payload(second).to_request();

    let (saved, uploaded) = futures::join!(test::call_service(&app, save), test::call_service(&app, upload));
    assert_eq!(saved.status(), StatusCode::CREATED);
    assert_eq!(uploaded.status(), StatusCode::OK);

    // the save carried the first batch only
    let stored = fake.rows.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["nombre"], "Ana");

    // the second batch is still pending review
    let body: Value = test::call_and_read_body_json(&app, get("/api/attendance", &hr).to_request()).await;
    assert_eq!(body["pending_records"], 2);
    assert_eq!(body["options"]["names"], json!(["Ana", "Luis"]));

    handle.stop(false).await;
}

#[actix_web::test]
async fn employees_cannot_save() {
    let (url, handle) = start_backend(FakeBackend::default()).await;
    let app = init_app!(common::config(&url));
    let employee = token(104, "ana", 3);

    let req = post("/api/attendance/save", &employee)
        .set_json(json!({"registrado_por": "Ana", "area": "Ventas"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    handle.stop(false).await;
}

#[actix_web::test]
async fn nothing_to_save_is_a_bad_request() {
    let (url, handle) = start_backend(FakeBackend::default()).await;
    let app = init_app!(common::config(&url));
    let hr = token(105, "rrhh", 2);

    let req = post("/api/attendance/save", &hr)
        .set_json(json!({"registrado_por": "RRHH", "area": "Ventas"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    handle.stop(false).await;
}

#[actix_web::test]
async fn backend_401_expires_the_session() {
    let fake = FakeBackend::with_rows(vec![persisted_row("Luis", "2024-03-01", None)]);
    let (url, handle) = start_backend(fake).await;
    let app = init_app!(common::config(&url));

    // locally valid token the backend no longer accepts
    let stale = token(106, EXPIRED_TOKEN_USER, 2);

    let workbook = exception_report(SHEET_NAME, &[("1", "Ana", "2024-03-04", Some("08:00:00"), None)]);
    let req = post("/api/attendance/upload", &stale).set_payload(workbook).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let resp = test::call_service(&app, post("/api/attendance/refresh", &stale).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "session_expired");
    assert_eq!(body["action"], "login");

    // cached state went with it
    let body: Value = test::call_and_read_body_json(&app, get("/api/attendance", &stale).to_request()).await;
    assert_eq!(body["pending_records"], 0);

    handle.stop(false).await;
}

#[actix_web::test]
async fn unreachable_backend_keeps_prior_data() {
    let fake = FakeBackend::with_rows(vec![persisted_row("Luis", "2024-03-01", Some("08:00:00"))]);
    let (url, handle) = start_backend(fake).await;
    let hr = token(107, "rrhh", 2);

    let app = init_app!(common::config(&url));
    let resp = test::call_service(&app, post("/api/attendance/refresh", &hr).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    handle.stop(false).await;

    // same session, backend gone
    let resp = test::call_service(&app, post("/api/attendance/refresh", &hr).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: Value = test::call_and_read_body_json(&app, get("/api/attendance", &hr).to_request()).await;
    assert_eq!(body["table"]["total"], 1);
}
