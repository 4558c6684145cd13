pub mod report;
pub mod session_cache;
