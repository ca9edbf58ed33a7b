//! Platform-agnostic wall-clock time
//!
//! Provides milliseconds since the UNIX epoch, the same scale as `Date.now()`.

#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    // A clock set before the epoch reads as zero; the session timer clamps from there.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_after_epoch() {
        // 2020-01-01T00:00:00Z
        assert!(now_millis() > 1_577_836_800_000.0);
    }
}
