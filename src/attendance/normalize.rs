use serde_json::{Map, Value};
use tracing::warn;

use super::ingest::parse_date_str;
use crate::model::attendance::AttendanceRecord;

/// Canonical field → every spelling the backends have been seen to use.
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("employee_id", &["id_empleado", "idEmpleado", "ID_EMPLEADO", "codigo", "Codigo", "CODIGO", "employee_id"]),
    ("name", &["nombre", "Nombre", "NOMBRE", "name"]),
    ("date", &["fecha", "Fecha", "FECHA", "date"]),
    ("clock_in", &["hora_entrada", "horaEntrada", "HORA_ENTRADA", "entrada", "Entrada", "clock_in"]),
    ("clock_out", &["hora_salida", "horaSalida", "HORA_SALIDA", "salida", "Salida", "clock_out"]),
    ("year", &["anio", "año", "Anio", "ANIO", "year"]),
    ("month", &["mes", "Mes", "MES", "month"]),
    ("record_id", &["id_registro", "idRegistro", "ID_REGISTRO", "id"]),
    ("registered_by", &["registrado_por", "registradoPor", "REGISTRADO_POR"]),
    ("area", &["area", "Area", "AREA", "área"]),
    ("report_url", &["pdf_reporte", "pdfReporte", "PDF_REPORTE", "url"]),
];

/// First non-null value stored under any alias of `canonical`.
fn lookup<'a>(row: &'a Map<String, Value>, canonical: &str) -> Option<&'a Value> {
    let (_, aliases) = FIELD_ALIASES.iter().find(|(name, _)| *name == canonical)?;
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .find(|v| !v.is_null())
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Maps one backend row to the canonical record. Rows without a usable date
/// yield `None`.
pub fn normalize_row(row: &Map<String, Value>) -> Option<AttendanceRecord> {
    let date = lookup(row, "date").and_then(as_text).and_then(|d| parse_date_str(&d))?;
    let text = |field| lookup(row, field).and_then(as_text);
    let int = |field| lookup(row, field).and_then(as_int);

    let mut record = AttendanceRecord::new(text("employee_id"), text("name"), date, text("clock_in"), text("clock_out"));
    record.year = int("year").and_then(|y| i32::try_from(y).ok());
    record.month = int("month")
        .and_then(|m| u32::try_from(m).ok())
        .filter(|m| (1..=12).contains(m));
    record.record_id = int("record_id");
    record.registered_by = text("registered_by");
    record.area = text("area");
    record.report_url = text("report_url");
    Some(record)
}

pub fn normalize_rows(rows: Vec<Value>) -> Vec<AttendanceRecord> {
    let total = rows.len();
    let records: Vec<_> = rows
        .iter()
        .filter_map(Value::as_object)
        .filter_map(normalize_row)
        .collect();

    if records.len() < total {
        warn!(dropped = total - records.len(), total, "Backend rows without a usable date");
    }
    records
}

/// Backend field names for a record, used when sending raw rows back.
pub fn to_backend_row(record: &AttendanceRecord) -> Value {
    serde_json::json!({
        "id_empleado": record.employee_id,
        "nombre": record.name,
        "fecha": record.date.format("%Y-%m-%d").to_string(),
        "hora_entrada": record.clock_in,
        "hora_salida": record.clock_out,
        "anio": record.year(),
        "mes": record.month(),
    })
}
