use crate::attendance::filter::FilterCriteria;
use crate::attendance::ingest::ingest_workbook;
use crate::attendance::merge::merge;
use crate::attendance::view::Dashboard;
use crate::auth::auth::AuthUser;
use crate::backend::AttendanceBackend;
use crate::config::Config;
use crate::error::{ApiError, BackendError};
use crate::model::attendance::AttendanceRecord;
use crate::model::report::{ReportEntry, SaveRequest};
use crate::utils::{report::build_report, session_cache};
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "0f8fad5b-d9cb-469f-a165-70867728950e")]
    pub upload_id: String,
    #[schema(example = 22)]
    pub count: usize,
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DashboardQuery {
    #[schema(example = 2024)]
    /// Filter by year
    pub year: Option<i32>,
    #[schema(example = 3)]
    /// Filter by month (1-12)
    pub month: Option<u32>,
    #[schema(example = "Ana Torres")]
    /// Filter by exact employee name
    pub name: Option<String>,
    #[schema(example = 1)]
    /// Table page (start with 1)
    pub page: Option<usize>,
    #[schema(example = 10)]
    /// Table rows per page
    pub per_page: Option<usize>,
}

impl DashboardQuery {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            year: self.year,
            month: self.month.filter(|m| (1..=12).contains(m)),
            name: self
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SaveResponse {
    pub report: ReportEntry,
    pub dashboard: Dashboard,
}

/// Maps a backend failure, dropping the session when the backend says the
/// token is no longer valid.
async fn backend_failure(user_id: u64, err: BackendError) -> ApiError {
    match err {
        BackendError::Unauthorized => {
            session_cache::clear(user_id).await;
            ApiError::SessionExpired
        }
        other => {
            error!(error = %other, user_id, "Attendance backend call failed");
            other.into()
        }
    }
}

/// Upload an exception report workbook
#[utoipa::path(
    post,
    path = "/api/attendance/upload",
    request_body(content = Vec<u8>, content_type = "application/octet-stream",
        description = "xlsx/xls/ods workbook containing the \"Reporte de Excepciones\" sheet"),
    responses(
        (status = 200, description = "Workbook ingested", body = UploadResponse),
        (status = 400, description = "Empty or unreadable file"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "File too large"),
        (status = 422, description = "Sheet missing or no valid rows", body = Object, example = json!({
            "error": "sheet_not_found",
            "message": "El archivo no contiene la hoja \"Reporte de Excepciones\""
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(name = "attendance_upload", skip_all, fields(user_id = auth.user_id))]
pub async fn upload(
    auth: AuthUser,
    config: web::Data<Config>,
    mut payload: web::Payload,
) -> actix_web::Result<impl Responder> {
    let limit = config.max_upload_bytes;
    let mut body = web::BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| ApiError::BadRequest { message: e.to_string() })?;
        if body.len() + chunk.len() > limit {
            warn!(limit, "Upload rejected: too large");
            return Err(ApiError::PayloadTooLarge { limit }.into());
        }
        body.extend_from_slice(&chunk);
    }

    if body.is_empty() {
        return Err(ApiError::BadRequest {
            message: "Seleccione un archivo".to_string(),
        }
        .into());
    }

    let bytes = body.to_vec();
    let records = web::block(move || ingest_workbook(bytes))
        .await
        .map_err(|e| {
            error!(error = %e, "Ingestion task failed");
            ApiError::Internal
        })?
        .map_err(|e| {
            info!(error = %e, "Workbook rejected");
            ApiError::from(e)
        })?;

    let upload_id = Uuid::new_v4().to_string();
    let count = records.len();

    let session = session_cache::session(auth.user_id, config.default_page_size).await;
    session.lock().await.replace_ingested(records.clone(), upload_id.clone());

    info!(%upload_id, count, "Attendance upload ready for review");
    Ok(HttpResponse::Ok().json(UploadResponse {
        upload_id,
        count,
        records,
    }))
}

/// Discard the ingested, not yet saved, records
#[utoipa::path(
    delete,
    path = "/api/attendance/upload",
    responses(
        (status = 204, description = "Pending upload discarded"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn discard_upload(
    auth: AuthUser,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let session = session_cache::session(auth.user_id, config.default_page_size).await;
    session.lock().await.discard_ingested();
    Ok(HttpResponse::NoContent().finish())
}

/// Reload persisted attendance from the backend
#[utoipa::path(
    post,
    path = "/api/attendance/refresh",
    responses(
        (status = 200, description = "Dataset refreshed", body = Dashboard),
        (status = 401, description = "Session expired", body = Object, example = json!({
            "error": "session_expired",
            "message": "Sesión expirada, inicie sesión nuevamente",
            "action": "login"
        })),
        (status = 502, description = "Backend unavailable; previous data kept")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(name = "attendance_refresh", skip_all, fields(user_id = auth.user_id))]
pub async fn refresh(
    auth: AuthUser,
    config: web::Data<Config>,
    backend: web::Data<AttendanceBackend>,
) -> actix_web::Result<impl Responder> {
    let session = session_cache::session(auth.user_id, config.default_page_size).await;
    let mut view = session.lock().await;

    let records = match backend.fetch_dashboard(&auth.token).await {
        Ok(records) => records,
        Err(e) => return Err(backend_failure(auth.user_id, e).await.into()),
    };

    view.replace_persisted(records);
    let dashboard = view.dashboard();

    Ok(HttpResponse::Ok().json(dashboard))
}

/// Filtered summary and paginated day table
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Summary, filter options and table page", body = Dashboard),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn dashboard(
    auth: AuthUser,
    config: web::Data<Config>,
    query: web::Query<DashboardQuery>,
) -> actix_web::Result<impl Responder> {
    let session = session_cache::session(auth.user_id, config.default_page_size).await;
    let mut view = session.lock().await;
    view.set_query(query.criteria(), query.page, query.per_page);
    let dashboard = view.dashboard();

    Ok(HttpResponse::Ok().json(dashboard))
}

/// Save the ingested records and their report to the backend
#[utoipa::path(
    post,
    path = "/api/attendance/save",
    request_body = SaveRequest,
    responses(
        (status = 201, description = "Saved", body = SaveResponse),
        (status = 400, description = "Nothing to save or missing fields"),
        (status = 401, description = "Session expired"),
        (status = 403, description = "HR/Admin only"),
        (status = 502, description = "Backend rejected the batch; nothing changed")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(name = "attendance_save", skip_all, fields(user_id = auth.user_id))]
pub async fn save(
    auth: AuthUser,
    config: web::Data<Config>,
    backend: web::Data<AttendanceBackend>,
    body: web::Json<SaveRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let request = SaveRequest {
        registrado_por: body.registrado_por.trim().to_string(),
        area: body.area.trim().to_string(),
    };
    if request.registrado_por.is_empty() || request.area.is_empty() {
        return Err(ApiError::BadRequest {
            message: "Complete los campos \"registrado_por\" y \"area\"".to_string(),
        }
        .into());
    }

    let session = session_cache::session(auth.user_id, config.default_page_size).await;
    let mut view = session.lock().await;
    if view.ingested.is_empty() {
        return Err(ApiError::BadRequest {
            message: "No hay registros cargados para guardar".to_string(),
        }
        .into());
    }

    let report = build_report(&view.ingested, &request).map_err(|e| {
        error!(error = %e, "Failed to render attendance report");
        ApiError::Internal
    })?;

    let receipt = match backend
        .persist(&auth.token, &request, report, &view.ingested)
        .await
    {
        Ok(receipt) => receipt,
        Err(e) => return Err(backend_failure(auth.user_id, e).await.into()),
    };

    let saved = view.ingested.clone();
    let entry = ReportEntry {
        id: receipt.id,
        document_url: receipt.document_url,
        registered_by: request.registrado_por,
        area: request.area,
        record_count: saved.len(),
        saved_at: Utc::now(),
    };
    info!(report_id = entry.id, records = entry.record_count, "Attendance batch saved");
    view.record_saved(entry.clone());

    // The backend rebuilds its dataset after a save; pull the fresh copy.
    match backend.fetch_dashboard(&auth.token).await {
        Ok(records) => view.replace_persisted(records),
        Err(BackendError::Unauthorized) => {
            return Err(backend_failure(auth.user_id, BackendError::Unauthorized).await.into());
        }
        Err(e) => {
            warn!(error = %e, "Saved, but reload failed; keeping saved rows locally");
            view.persisted = merge(&saved, &view.persisted);
        }
    }

    let dashboard = view.dashboard();

    Ok(HttpResponse::Created().json(SaveResponse {
        report: entry,
        dashboard,
    }))
}

/// Reports saved during this session
#[utoipa::path(
    get,
    path = "/api/attendance/history",
    responses(
        (status = 200, description = "Saved reports, oldest first", body = Vec<ReportEntry>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let session = session_cache::session(auth.user_id, config.default_page_size).await;
    let history = session.lock().await.history.clone();
    Ok(HttpResponse::Ok().json(history))
}
