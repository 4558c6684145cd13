use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, Error};
use serde_json::json;

/// Reasons an uploaded workbook produces no records.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("sheet \"{}\" not found in workbook", crate::attendance::ingest::SHEET_NAME)]
    SheetNotFound,
    #[error("no row with a valid date was found")]
    EmptyResult,
    #[error("unreadable workbook: {0}")]
    Workbook(#[from] calamine::Error),
}

/// Failures talking to the attendance backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend rejected the session")]
    Unauthorized,
    #[error("backend answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected backend payload: {0}")]
    Decode(String),
}

#[derive(Debug, Display, Error)]
pub enum ApiError {
    #[display(fmt = "El archivo no contiene la hoja \"Reporte de Excepciones\"")]
    SheetNotFound,

    #[display(fmt = "No se encontraron datos válidos en el archivo")]
    EmptyResult,

    #[display(fmt = "No se pudo leer el archivo: {}", message)]
    InvalidWorkbook { message: String },

    #[display(fmt = "El archivo supera el tamaño máximo de {} bytes", limit)]
    PayloadTooLarge { limit: usize },

    #[display(fmt = "{}", message)]
    BadRequest { message: String },

    #[display(fmt = "Sesión expirada, inicie sesión nuevamente")]
    SessionExpired,

    #[display(fmt = "Error al comunicarse con el servidor: {}", message)]
    Backend { message: String },

    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::SheetNotFound => "sheet_not_found",
            ApiError::EmptyResult => "empty_result",
            ApiError::InvalidWorkbook { .. } => "invalid_workbook",
            ApiError::PayloadTooLarge { .. } => "payload_too_large",
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::SessionExpired => "session_expired",
            ApiError::Backend { .. } => "backend_error",
            ApiError::Internal => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::SheetNotFound | ApiError::EmptyResult => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidWorkbook { .. } | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::SessionExpired => StatusCode::UNAUTHORIZED,
            ApiError::Backend { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        if matches!(self, ApiError::SessionExpired) {
            body["action"] = json!("login");
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::SheetNotFound => ApiError::SheetNotFound,
            IngestError::EmptyResult => ApiError::EmptyResult,
            IngestError::Workbook(e) => ApiError::InvalidWorkbook { message: e.to_string() },
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Unauthorized => ApiError::SessionExpired,
            other => ApiError::Backend { message: other.to_string() },
        }
    }
}
