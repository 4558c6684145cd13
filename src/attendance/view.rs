use chrono::{Datelike, Weekday};
use serde::Serialize;
use utoipa::ToSchema;

use super::derive::DerivedRecord;
use super::filter::{FilterCriteria, FilterOptions, filter, filter_options};
use super::merge::merge;
use super::summary::{AttendanceSummary, summarize};
use crate::model::attendance::AttendanceRecord;
use crate::model::report::ReportEntry;

pub const MAX_PAGE_SIZE: usize = 100;

/// Drops Sunday rows. Only the table goes through this; summaries are
/// computed before it.
pub fn exclude_sundays(records: Vec<AttendanceRecord>) -> Vec<AttendanceRecord> {
    records
        .into_iter()
        .filter(|r| r.date.weekday() != Weekday::Sun)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[aliases(DerivedRecordPage = Page<DerivedRecord>)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[schema(example = 1)]
    pub page: usize,
    #[schema(example = 10)]
    pub per_page: usize,
    #[schema(example = 42)]
    pub total: usize,
    #[schema(example = 5)]
    pub total_pages: usize,
}

/// 1-based paging. Out-of-range pages are clamped to the nearest valid one.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let per_page = page_size.clamp(1, MAX_PAGE_SIZE);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let data = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        data,
        page,
        per_page,
        total,
        total_pages,
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub filters: FilterCriteria,
    pub options: FilterOptions,
    pub summary: AttendanceSummary,
    #[schema(value_type = DerivedRecordPage)]
    pub table: Page<DerivedRecord>,
    /// Ingested rows not saved yet
    pub pending_records: usize,
}

/// Everything one user's attendance screen holds between requests.
#[derive(Debug, Clone)]
pub struct AttendanceView {
    pub ingested: Vec<AttendanceRecord>,
    pub upload_id: Option<String>,
    pub persisted: Vec<AttendanceRecord>,
    pub filters: FilterCriteria,
    pub page: usize,
    pub page_size: usize,
    pub history: Vec<ReportEntry>,
}

impl AttendanceView {
    pub fn new(page_size: usize) -> Self {
        Self {
            ingested: Vec::new(),
            upload_id: None,
            persisted: Vec::new(),
            filters: FilterCriteria::default(),
            page: 1,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            history: Vec::new(),
        }
    }

    /// A new upload replaces whatever was ingested before.
    pub fn replace_ingested(&mut self, records: Vec<AttendanceRecord>, upload_id: String) {
        self.ingested = records;
        self.upload_id = Some(upload_id);
        self.page = 1;
    }

    pub fn discard_ingested(&mut self) {
        self.ingested.clear();
        self.upload_id = None;
        self.page = 1;
    }

    pub fn replace_persisted(&mut self, records: Vec<AttendanceRecord>) {
        self.persisted = records;
    }

    pub fn set_query(&mut self, filters: FilterCriteria, page: Option<usize>, page_size: Option<usize>) {
        if filters != self.filters {
            self.page = 1;
        }
        self.filters = filters;
        if let Some(size) = page_size {
            self.page_size = size.clamp(1, MAX_PAGE_SIZE);
        }
        if let Some(page) = page {
            self.page = page.max(1);
        }
    }

    pub fn record_saved(&mut self, entry: ReportEntry) {
        self.history.push(entry);
        self.discard_ingested();
    }

    pub fn dataset(&self) -> Vec<AttendanceRecord> {
        merge(&self.ingested, &self.persisted)
    }

    pub fn dashboard(&self) -> Dashboard {
        let all = self.dataset();
        let options = filter_options(&all);
        let filtered = filter(&all, &self.filters);

        let summary = summarize(&filtered, self.filters.name.as_deref());

        let rows: Vec<DerivedRecord> = exclude_sundays(filtered)
            .into_iter()
            .map(DerivedRecord::from)
            .collect();

        Dashboard {
            filters: self.filters.clone(),
            options,
            summary,
            table: paginate(rows, self.page, self.page_size),
            pending_records: self.ingested.len(),
        }
    }
}
