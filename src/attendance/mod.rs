//! Attendance derivation: spreadsheet ingestion, backend row normalization,
//! per-day rules, filtering, aggregation and the table view.

pub mod derive;
pub mod filter;
pub mod ingest;
pub mod merge;
pub mod normalize;
pub mod summary;
pub mod time;
pub mod view;
