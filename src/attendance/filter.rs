use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::attendance::AttendanceRecord;

/// Year, month and name filters. `None` switches a filter off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FilterCriteria {
    #[schema(example = 2024)]
    pub year: Option<i32>,
    /// 1-based
    #[schema(example = 3)]
    pub month: Option<u32>,
    #[schema(example = "Ana Torres")]
    pub name: Option<String>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.year.is_none_or(|y| record.year() == y)
            && self.month.is_none_or(|m| record.month() == m)
            && self.name.as_deref().is_none_or(|n| record.name == n)
    }
}

pub fn filter(records: &[AttendanceRecord], criteria: &FilterCriteria) -> Vec<AttendanceRecord> {
    records.iter().filter(|r| criteria.matches(r)).cloned().collect()
}

/// Choices offered by each filter, always taken from the whole dataset so
/// picking one filter never narrows the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FilterOptions {
    /// Newest first
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub names: Vec<String>,
}

pub fn filter_options(records: &[AttendanceRecord]) -> FilterOptions {
    let years: BTreeSet<i32> = records.iter().map(AttendanceRecord::year).collect();
    let months: BTreeSet<u32> = records.iter().map(AttendanceRecord::month).collect();
    let names: BTreeSet<&str> = records.iter().map(|r| r.name.as_str()).collect();

    FilterOptions {
        years: years.into_iter().rev().collect(),
        months: months.into_iter().collect(),
        names: names.into_iter().map(str::to_string).collect(),
    }
}
