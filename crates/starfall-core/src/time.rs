use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch. Wall clock; only used for session durations.
pub fn now_millis() -> u64 {
    let dur = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
}

/// Milliseconds elapsed since `started_ms`, saturating at zero if the clock went backwards.
pub fn elapsed_since(started_ms: u64) -> u64 {
    now_millis().saturating_sub(started_ms)
}
