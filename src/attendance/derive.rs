use serde::Serialize;
use utoipa::ToSchema;

use super::time::{
    OVERTIME_CUTOFF_MIN, PUNCTUALITY_CUTOFF_MIN, minutes_since_midnight, parse_time,
    punctuality_cutoff,
};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// Classifies a day by its clock-in. The 09:00:00 boundary itself counts as
/// punctual. A clock-in that cannot be read as a time is treated as missing.
pub fn classify(clock_in: Option<&str>) -> AttendanceStatus {
    match clock_in.and_then(parse_time) {
        None => AttendanceStatus::NotRegistered,
        Some(t) if t <= punctuality_cutoff() => AttendanceStatus::Early,
        Some(_) => AttendanceStatus::Late,
    }
}

/// Minutes past 09:00, never negative.
pub fn tardiness_minutes(clock_in: Option<&str>) -> i64 {
    clock_in
        .and_then(parse_time)
        .map(|t| (minutes_since_midnight(t) - PUNCTUALITY_CUTOFF_MIN).max(0))
        .unwrap_or(0)
}

/// Minutes past 18:00, credited only on punctual days.
pub fn overtime_minutes(clock_in: Option<&str>, clock_out: Option<&str>) -> i64 {
    if classify(clock_in) != AttendanceStatus::Early {
        return 0;
    }
    match clock_out.and_then(parse_time).map(minutes_since_midnight) {
        Some(out) if out > OVERTIME_CUTOFF_MIN => out - OVERTIME_CUTOFF_MIN,
        _ => 0,
    }
}

/// Minutes arrived before 09:00. Needs a clock-out: without one the day's
/// hours are unknown and no credit is given.
pub fn owed_minutes(clock_in: Option<&str>, clock_out: Option<&str>) -> i64 {
    if clock_out.is_none() {
        return 0;
    }
    match (classify(clock_in), clock_in.and_then(parse_time)) {
        (AttendanceStatus::Early, Some(t)) => PUNCTUALITY_CUTOFF_MIN - minutes_since_midnight(t),
        _ => 0,
    }
}

impl AttendanceRecord {
    pub fn status(&self) -> AttendanceStatus {
        classify(self.clock_in.as_deref())
    }

    pub fn tardiness_minutes(&self) -> i64 {
        tardiness_minutes(self.clock_in.as_deref())
    }

    pub fn overtime_minutes(&self) -> i64 {
        overtime_minutes(self.clock_in.as_deref(), self.clock_out.as_deref())
    }

    pub fn owed_minutes(&self) -> i64 {
        owed_minutes(self.clock_in.as_deref(), self.clock_out.as_deref())
    }
}

/// A table row: the record plus everything computed from it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DerivedRecord {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub status: AttendanceStatus,
    pub tardiness_minutes: i64,
    pub overtime_minutes: i64,
    pub owed_minutes: i64,
}

impl From<AttendanceRecord> for DerivedRecord {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            status: record.status(),
            tardiness_minutes: record.tardiness_minutes(),
            overtime_minutes: record.overtime_minutes(),
            owed_minutes: record.owed_minutes(),
            record,
        }
    }
}
