use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Placeholder shown when a sheet row carries no id or name.
pub const PLACEHOLDER: &str = "-";

/// One employee-day of attendance.
///
/// `date` is always present; every other field may be missing. The derived
/// figures (status, tardiness, overtime) are never stored here, they are
/// computed on demand from `clock_in` / `clock_out`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": "1024",
    "name": "Ana Torres",
    "date": "2024-03-04",
    "clock_in": "08:45:00",
    "clock_out": "19:10:00",
    "year": 2024,
    "month": 3
}))]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub name: String,
    #[schema(example = "2024-03-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "08:45:00", nullable = true)]
    pub clock_in: Option<String>,
    #[schema(example = "19:10:00", nullable = true)]
    pub clock_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    // Present only on rows that came back from the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
}

impl AttendanceRecord {
    pub fn new(
        employee_id: Option<String>,
        name: Option<String>,
        date: NaiveDate,
        clock_in: Option<String>,
        clock_out: Option<String>,
    ) -> Self {
        Self {
            employee_id: non_blank_or_placeholder(employee_id),
            name: non_blank_or_placeholder(name),
            date,
            clock_in,
            clock_out,
            year: None,
            month: None,
            record_id: None,
            registered_by: None,
            area: None,
            report_url: None,
        }
    }

    /// Explicit `year` when supplied, otherwise the calendar year of `date`.
    pub fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| self.date.year())
    }

    /// Explicit 1-based `month` when supplied, otherwise the month of `date`.
    pub fn month(&self) -> u32 {
        self.month.unwrap_or_else(|| self.date.month())
    }
}

fn non_blank_or_placeholder(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    /// Clocked in at or before the punctuality cutoff.
    Early,
    Late,
    /// No clock-in on record (absence or holiday).
    NotRegistered,
}

impl AttendanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Early => "Temprano",
            AttendanceStatus::Late => "Tarde",
            AttendanceStatus::NotRegistered => "No registrado",
        }
    }
}
