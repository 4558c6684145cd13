use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Free-text fields sent along with a saved batch.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SaveRequest {
    #[schema(example = "Recursos Humanos")]
    pub registrado_por: String,
    #[schema(example = "Administración")]
    pub area: String,
}

/// What the backend hands back after persisting a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PersistReceipt {
    pub id: i64,
    #[schema(nullable = true)]
    pub document_url: Option<String>,
}

/// One entry of the locally kept save history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportEntry {
    pub id: i64,
    #[schema(nullable = true)]
    pub document_url: Option<String>,
    pub registered_by: String,
    pub area: String,
    pub record_count: usize,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub saved_at: DateTime<Utc>,
}
