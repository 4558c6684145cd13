use crate::api::attendance::{DashboardQuery, SaveResponse, UploadResponse};
use crate::attendance::derive::DerivedRecord;
use crate::attendance::filter::{FilterCriteria, FilterOptions};
use crate::attendance::summary::AttendanceSummary;
use crate::attendance::view::{Dashboard, DerivedRecordPage};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::report::{PersistReceipt, ReportEntry, SaveRequest};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Hub API",
        version = "0.1.0",
        description = r#"
## Attendance Hub

Reconciles employee attendance from the biometric clock's **exception report**
with what the attendance backend already stores.

### Key Features
- **Upload**: read the "Reporte de Excepciones" sheet of an xlsx/xls/ods workbook
- **Review**: filter by year, month and employee; punctuality, tardiness and
  overtime totals with a net balance
- **Save**: send the batch plus a generated report to the backend

### Rules
- Arrival at or before **09:00:00** is punctual, later is late
- Overtime counts minutes after **18:00**, only on punctual days
- Sunday rows are counted in totals but hidden from the day table

### Security
All endpoints require a **JWT Bearer** token; the same token is forwarded to
the attendance backend. A `401` with `"action": "login"` means the session
has expired.
"#,
    ),
    paths(
        crate::api::attendance::upload,
        crate::api::attendance::discard_upload,
        crate::api::attendance::refresh,
        crate::api::attendance::dashboard,
        crate::api::attendance::save,
        crate::api::attendance::history
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            DerivedRecord,
            DerivedRecordPage,
            FilterCriteria,
            FilterOptions,
            AttendanceSummary,
            Dashboard,
            DashboardQuery,
            UploadResponse,
            SaveRequest,
            SaveResponse,
            PersistReceipt,
            ReportEntry
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance upload, review and save APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
