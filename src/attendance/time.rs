use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

/// 09:00 expressed in minutes since midnight.
pub const PUNCTUALITY_CUTOFF_MIN: i64 = 9 * 60;
/// 18:00 expressed in minutes since midnight.
pub const OVERTIME_CUTOFF_MIN: i64 = 18 * 60;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// 09:00:00, inclusive upper bound of a punctual arrival.
pub fn punctuality_cutoff() -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(PUNCTUALITY_CUTOFF_MIN as u32 * 60, 0).unwrap_or_default()
}

/// Parses a clock reading such as `08:45:00` or `8:45`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Whole minutes since midnight; seconds are dropped.
pub fn minutes_since_midnight(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

pub fn format_time(t: NaiveTime) -> String {
    format!("{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second())
}

/// Converts a spreadsheet serial day number to a calendar date.
///
/// Day zero is 1899-12-30, which absorbs the phantom 1900-02-29 for every
/// serial from 61 upward.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = serial.floor() as i64;
    epoch.checked_add_signed(Duration::try_days(days)?)
}

/// Decodes the fractional part of a spreadsheet serial as a time of day.
pub fn serial_to_time(serial: f64) -> Option<NaiveTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let secs = (serial.fract() * SECONDS_PER_DAY).round() as u32;
    // 23:59:59.6 rounds up to a full day
    let secs = secs.min(86_399);
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
}

/// Reads an ISO-8601 time-of-day duration such as `PT08H45M00S`, the form
/// OpenDocument sheets store time cells in. Fractional seconds are rounded.
pub fn parse_iso_duration(raw: &str) -> Option<NaiveTime> {
    let mut rest = raw.trim().strip_prefix("PT")?;
    if rest.is_empty() {
        return None;
    }

    let mut secs = 0.0_f64;
    for (unit, scale) in [('H', 3600.0), ('M', 60.0), ('S', 1.0)] {
        if let Some(pos) = rest.find(unit) {
            let value: f64 = rest[..pos].parse().ok()?;
            secs += value * scale;
            rest = &rest[pos + 1..];
        }
    }
    if !rest.is_empty() || !secs.is_finite() || secs < 0.0 {
        return None;
    }

    let secs = secs.round() as u32;
    if secs >= 86_400 {
        return None;
    }
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
}
