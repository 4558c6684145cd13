use futures::lock::Mutex;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

use crate::attendance::view::AttendanceView;

/// One user's view. Handlers hold the lock for the whole request, backend
/// calls included, so overlapping requests from the same user run in turn.
pub type SharedView = Arc<Mutex<AttendanceView>>;

/// user id => that user's attendance screen state
pub static SESSION_CACHE: Lazy<Cache<u64, SharedView>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_idle(Duration::from_secs(8 * 3600)) // one working day
        .build()
});

/// Session for `user_id`, created on first use.
pub async fn session(user_id: u64, default_page_size: usize) -> SharedView {
    SESSION_CACHE
        .get_with(user_id, async move {
            Arc::new(Mutex::new(AttendanceView::new(default_page_size)))
        })
        .await
}

/// Forget everything held for `user_id` (session expired upstream).
pub async fn clear(user_id: u64) {
    SESSION_CACHE.invalidate(&user_id).await;
    log::info!("Attendance session cleared for user {}", user_id);
}
