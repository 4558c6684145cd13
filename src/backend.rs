use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::attendance::normalize::{normalize_rows, to_backend_row};
use crate::config::Config;
use crate::error::BackendError;
use crate::model::attendance::AttendanceRecord;
use crate::model::report::{PersistReceipt, SaveRequest};

pub const REPORT_FILE_NAME: &str = "reporte_asistencias.xlsx";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Client for the attendance backend. One attempt per call, no retries.
#[derive(Clone, Debug)]
pub struct AttendanceBackend {
    client: Client,
    base_url: String,
}

impl AttendanceBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        Self::new(
            &config.attendance_api_url,
            Duration::from_secs(config.backend_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Rows already persisted by the backend, normalized.
    #[instrument(name = "backend_fetch_dashboard", skip_all)]
    pub async fn fetch_dashboard(&self, token: &str) -> Result<Vec<AttendanceRecord>, BackendError> {
        let resp = self
            .client
            .get(self.url("/asistencias/dashboard"))
            .bearer_auth(token)
            .send()
            .await?;

        let rows: Vec<Value> = check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        debug!(rows = rows.len(), "Dashboard rows received");
        Ok(normalize_rows(rows))
    }

    /// Uploads the generated report together with the raw rows it was built
    /// from. The backend regenerates its dataset on success.
    #[instrument(name = "backend_persist", skip_all, fields(records = records.len()))]
    pub async fn persist(
        &self,
        token: &str,
        request: &SaveRequest,
        report: Vec<u8>,
        records: &[AttendanceRecord],
    ) -> Result<PersistReceipt, BackendError> {
        let rows: Vec<Value> = records.iter().map(to_backend_row).collect();
        let registros = serde_json::to_string(&rows).map_err(|e| BackendError::Decode(e.to_string()))?;

        let report_part = Part::bytes(report)
            .file_name(REPORT_FILE_NAME)
            .mime_str(XLSX_MIME)?;

        let form = Form::new()
            .text("registrado_por", request.registrado_por.clone())
            .text("area", request.area.clone())
            .text("registros", registros)
            .part("pdf_reporte", report_part);

        let resp = self
            .client
            .post(self.url("/asistencias"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let body: Value = check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        parse_receipt(&body)
    }
}

async fn check_status(resp: Response) -> Result<Response, BackendError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        warn!("Backend rejected bearer token");
        return Err(BackendError::Unauthorized);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/// Accepts `{id, pdf_reporte}` as well as the same object wrapped in `data`.
fn parse_receipt(body: &Value) -> Result<PersistReceipt, BackendError> {
    let obj = body.get("data").filter(|d| d.is_object()).unwrap_or(body);

    let id = ["id", "id_registro"]
        .iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .ok_or_else(|| BackendError::Decode(format!("no id in response: {body}")))?;

    let document_url = ["pdf_reporte", "url", "document_url"]
        .iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| v.as_str())
        .map(str::to_string);

    Ok(PersistReceipt { id, document_url })
}
