use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, stored in `events.created_at`.
///
/// A clock set before 1970 yields 0 rather than failing the insert.
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
