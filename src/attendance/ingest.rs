use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use super::time::{format_time, parse_iso_duration, serial_to_date, serial_to_time};
use crate::error::IngestError;
use crate::model::attendance::AttendanceRecord;

/// The only sheet the exception report export is read from.
pub const SHEET_NAME: &str = "Reporte de Excepciones";
/// Rows 0..=3 hold the report banner and column headers.
pub const DATA_START_ROW: u32 = 4;

const COL_ID: u32 = 0;
const COL_NAME: u32 = 1;
const COL_DATE: u32 = 3;
const COL_CLOCK_IN: u32 = 4;
const COL_CLOCK_OUT: u32 = 5;

const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

static EMPTY_CELL: Data = Data::Empty;

/// Reads an uploaded workbook and returns its attendance rows in sheet order.
pub fn ingest_workbook(bytes: Vec<u8>) -> Result<Vec<AttendanceRecord>, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    if !workbook.sheet_names().iter().any(|s| s == SHEET_NAME) {
        debug!(sheets = ?workbook.sheet_names(), "Exception report sheet missing");
        return Err(IngestError::SheetNotFound);
    }

    let range = workbook.worksheet_range(SHEET_NAME)?;
    let records = ingest_range(&range);

    if records.is_empty() {
        return Err(IngestError::EmptyResult);
    }

    info!(count = records.len(), "Spreadsheet ingested");
    Ok(records)
}

/// Converts sheet rows into records. Rows whose date cannot be resolved are
/// dropped; everything else degrades to an absent field.
pub fn ingest_range(range: &Range<Data>) -> Vec<AttendanceRecord> {
    let Some((last_row, _)) = range.end() else {
        return Vec::new();
    };

    let cell = |row: u32, col: u32| range.get_value((row, col)).unwrap_or(&EMPTY_CELL);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in DATA_START_ROW..=last_row {
        let Some(date) = cell_to_date(cell(row, COL_DATE)) else {
            skipped += 1;
            continue;
        };

        records.push(AttendanceRecord::new(
            cell_to_text(cell(row, COL_ID)),
            cell_to_text(cell(row, COL_NAME)),
            date,
            cell_to_time(cell(row, COL_CLOCK_IN)),
            cell_to_time(cell(row, COL_CLOCK_OUT)),
        ));
    }

    debug!(kept = records.len(), skipped, "Sheet rows processed");
    records
}

fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

pub(crate) fn cell_to_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        // as_datetime applies the workbook's 1900/1904 date system; serials
        // below one (bare times) land in 1899 and are rejected
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()).filter(|d| d.year() >= 1900),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_str(s),
        Data::Float(f) => serial_to_date(*f),
        Data::Int(i) => serial_to_date(*i as f64),
        _ => None,
    }
}

fn cell_to_time(cell: &Data) -> Option<String> {
    match cell {
        Data::DateTime(dt) => serial_to_time(dt.as_f64()).map(format_time),
        Data::Float(f) => serial_to_time(*f).map(format_time),
        Data::Int(i) => serial_to_time(*i as f64).map(format_time),
        Data::DateTimeIso(s) => match NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S%.f") {
            Ok(dt) => Some(format_time(dt.time())),
            Err(_) => verbatim(s),
        },
        Data::DurationIso(s) => parse_iso_duration(s).map(format_time).or_else(|| verbatim(s)),
        Data::String(s) => verbatim(s),
        _ => None,
    }
}

fn verbatim(s: &str) -> Option<String> {
    Some(s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolves a textual date. A leading `YYYY-MM-DD` decides on its own; other
/// layouts and serial numbers are only tried when that pattern is absent.
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Some(head) = raw.get(..10).filter(|h| is_iso_date_shape(h)) {
        return NaiveDate::parse_from_str(head, "%Y-%m-%d").ok();
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| raw.parse::<f64>().ok().and_then(serial_to_date))
}

fn is_iso_date_shape(s: &str) -> bool {
    s.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    })
}
