use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// Counters and minute totals over a set of days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub on_time_count: usize,
    pub late_count: usize,
    pub absent_count: usize,
    pub total_tardiness_minutes: i64,
    /// Minutes arrived before 09:00 on days with a clock-out.
    pub total_owed_minutes: i64,
    pub total_overtime_minutes: i64,
    /// `owed - tardiness + overtime`; positive means the company owes time.
    pub net_owed_or_extra_minutes: i64,
}

/// Aggregates `records`, optionally narrowed to a single employee name.
pub fn summarize(records: &[AttendanceRecord], selected_name: Option<&str>) -> AttendanceSummary {
    let mut s = AttendanceSummary::default();

    for r in records
        .iter()
        .filter(|r| selected_name.is_none_or(|n| r.name == n))
    {
        match r.status() {
            AttendanceStatus::Early => s.on_time_count += 1,
            AttendanceStatus::Late => s.late_count += 1,
            AttendanceStatus::NotRegistered => s.absent_count += 1,
        }
        s.total_tardiness_minutes += r.tardiness_minutes();
        s.total_owed_minutes += r.owed_minutes();
        s.total_overtime_minutes += r.overtime_minutes();
    }

    s.net_owed_or_extra_minutes =
        s.total_owed_minutes - s.total_tardiness_minutes + s.total_overtime_minutes;
    s
}

/// `-65` → `-1h 05m`
pub fn format_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let abs = minutes.unsigned_abs();
    format!("{sign}{}h {:02}m", abs / 60, abs % 60)
}
