#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, dev::ServerHandle, web};
use attendance_hub::attendance::ingest::SHEET_NAME;
use attendance_hub::auth::jwt::generate_access_token;
use attendance_hub::config::Config;
use rust_xlsxwriter::{Format, Workbook};
use serde_json::{Value, json};

pub const SECRET: &str = "test-secret";
pub const EXPIRED_TOKEN_USER: &str = "expired";

pub fn config(backend_url: &str) -> Config {
    let backend_url = backend_url.to_string();
    Config::from_lookup(move |key| match key {
        "SERVER_ADDR" => Some("127.0.0.1:0".into()),
        "JWT_SECRET" => Some(SECRET.into()),
        "ATTENDANCE_API_URL" => Some(backend_url.clone()),
        "BACKEND_TIMEOUT_SECS" => Some("5".into()),
        _ => None,
    })
    .expect("test config")
}

/// Role 2 is HR, 3 is a plain employee.
pub fn token(user_id: u64, username: &str, role: u8) -> String {
    generate_access_token(user_id, username.into(), role, None, SECRET, 3600).expect("token")
}

/// One data row of the exception report: id, name, date, in, out.
pub type Row<'a> = (&'a str, &'a str, &'a str, Option<&'a str>, Option<&'a str>);

/// Builds an xlsx with the exception report layout: four banner rows, data
/// from the fifth.
pub fn exception_report(sheet_name: &str, rows: &[Row]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name).unwrap();
        sheet.write_string(0, 0, "Reporte de Excepciones").unwrap();
        sheet.write_string(2, 0, "Desde 2024-03-01 hasta 2024-03-31").unwrap();
        for (col, h) in ["ID", "Nombre", "Departamento", "Fecha", "Entrada", "Salida"].iter().enumerate() {
            sheet.write_string(3, col as u16, *h).unwrap();
        }
        for (i, (id, name, date, clock_in, clock_out)) in rows.iter().enumerate() {
            let row = 4 + i as u32;
            sheet.write_string(row, 0, *id).unwrap();
            sheet.write_string(row, 1, *name).unwrap();
            sheet.write_string(row, 2, "Ventas").unwrap();
            sheet.write_string(row, 3, *date).unwrap();
            if let Some(t) = clock_in {
                sheet.write_string(row, 4, *t).unwrap();
            }
            if let Some(t) = clock_out {
                sheet.write_string(row, 5, *t).unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// Same layout, but with real date and time cells instead of text.
pub fn exception_report_with_native_cells() -> Vec<u8> {
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let time_format = Format::new().set_num_format("hh:mm:ss");

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME).unwrap();
        sheet.write_string(0, 0, "Reporte de Excepciones").unwrap();
        // 45355 = 2024-03-04, 0.364583333 = 08:45:00, 0.798611111 = 19:10:00
        sheet.write_number(4, 0, 1024).unwrap();
        sheet.write_string(4, 1, "Ana Torres").unwrap();
        sheet.write_number_with_format(4, 3, 45355.0, &date_format).unwrap();
        sheet.write_number_with_format(4, 4, 0.364583333, &time_format).unwrap();
        sheet.write_number_with_format(4, 5, 0.798611111, &time_format).unwrap();
    }
    workbook.save_to_buffer().unwrap()
}

/// In-process stand-in for the attendance backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub rows: Arc<Mutex<Vec<Value>>>,
    pub uploads: Arc<Mutex<Vec<String>>>,
    pub fail_persist: Arc<Mutex<bool>>,
    /// Milliseconds the persist endpoint waits before answering
    pub persist_delay_ms: Arc<Mutex<u64>>,
}

impl FakeBackend {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        let fake = Self::default();
        *fake.rows.lock().unwrap() = rows;
        fake
    }
}

fn bearer(req: &HttpRequest) -> String {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

fn is_expired(req: &HttpRequest) -> bool {
    let token = bearer(req);
    attendance_hub::auth::jwt::verify_token(&token, SECRET)
        .map(|c| c.sub == EXPIRED_TOKEN_USER)
        .unwrap_or(true)
}

async fn dashboard(req: HttpRequest, fake: web::Data<FakeBackend>) -> HttpResponse {
    if is_expired(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let rows = fake.rows.lock().unwrap().clone();
    HttpResponse::Ok().json(rows)
}

/// Pulls the `registros` text part out of a multipart body.
fn registros_part(body: &str) -> Option<Vec<Value>> {
    let start = body.find("name=\"registros\"")?;
    let rest = &body[start..];
    let json_start = rest.find("\r\n\r\n")? + 4;
    let json_end = rest[json_start..].find("\r\n--")? + json_start;
    serde_json::from_str(&rest[json_start..json_end]).ok()
}

async fn persist(req: HttpRequest, body: web::Bytes, fake: web::Data<FakeBackend>) -> HttpResponse {
    if is_expired(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let delay = *fake.persist_delay_ms.lock().unwrap();
    if delay > 0 {
        actix_web::rt::time::sleep(std::time::Duration::from_millis(delay)).await;
    }
    if *fake.fail_persist.lock().unwrap() {
        return HttpResponse::InternalServerError().body("disk full");
    }

    let text = String::from_utf8_lossy(&body).to_string();
    let Some(rows) = registros_part(&text) else {
        return HttpResponse::BadRequest().body("registros missing");
    };

    let id = {
        let mut uploads = fake.uploads.lock().unwrap();
        uploads.push(text);
        40 + uploads.len() as i64
    };

    let mut stored = fake.rows.lock().unwrap();
    for mut row in rows {
        row["id_registro"] = json!(id);
        stored.push(row);
    }

    HttpResponse::Ok().json(json!({"id": id, "pdf_reporte": format!("http://files.local/{id}.xlsx")}))
}

/// Starts the fake backend on an ephemeral port and returns its base URL.
pub async fn start_backend(fake: FakeBackend) -> (String, ServerHandle) {
    let data = web::Data::new(fake);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/asistencias/dashboard", web::get().to(dashboard))
            .route("/asistencias", web::post().to(persist))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind fake backend");

    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{addr}"), handle)
}
