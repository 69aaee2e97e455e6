//! Second-granularity timestamp cache.
//!
//! Formatting a wall-clock date is comparatively expensive, and a busy
//! server dumps many requests within the same second. Each execution
//! context keeps one [`TimestampCache`] and only reformats once the stored
//! second has fully elapsed.
//!
//! A cache is owned by exactly one context and is never shared.

use chrono::{DateTime, Local, Utc};
use rd_config::TimestampZone;

/// Rendering used for the START/END TIME lines, e.g. `07-Mar-2024 14:32:09`.
pub const TIMESTAMP_FORMAT: &str = "%d-%b-%Y %H:%M:%S";

/// Cached formatted timestamp for one execution context.
#[derive(Debug, Clone)]
pub struct TimestampCache {
    /// Start of the cached second, in epoch milliseconds.
    mark_ms: i64,
    rendered: String,
    zone: TimestampZone,
}

impl TimestampCache {
    /// Create a cache holding the epoch rendering.
    pub fn new(zone: TimestampZone) -> Self {
        Self {
            mark_ms: 0,
            rendered: render(0, zone),
            zone,
        }
    }

    /// The formatted current time.
    pub fn current(&mut self) -> &str {
        self.at(Utc::now().timestamp_millis())
    }

    /// The formatted time for `now_ms` (epoch milliseconds).
    ///
    /// Reformats only when the cached second has fully elapsed; otherwise
    /// returns the cached string unchanged.
    pub fn at(&mut self, now_ms: i64) -> &str {
        if self.mark_ms + 999 < now_ms {
            self.mark_ms = now_ms - now_ms.rem_euclid(1000);
            self.rendered = render(self.mark_ms, self.zone);
        }
        &self.rendered
    }

    /// Start of the cached second, in epoch milliseconds.
    pub fn mark_ms(&self) -> i64 {
        self.mark_ms
    }

    pub fn zone(&self) -> TimestampZone {
        self.zone
    }
}

fn render(epoch_ms: i64, zone: TimestampZone) -> String {
    let utc = DateTime::<Utc>::from_timestamp_millis(epoch_ms).unwrap_or_default();
    match zone {
        TimestampZone::Utc => utc.format(TIMESTAMP_FORMAT).to_string(),
        TimestampZone::Local => utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-07T14:32:09Z
    const BASE_MS: i64 = 1_709_821_929_000;

    #[test]
    fn test_fresh_cache_holds_epoch() {
        let cache = TimestampCache::new(TimestampZone::Utc);
        assert_eq!(cache.mark_ms(), 0);
        assert_eq!(cache.rendered, "01-Jan-1970 00:00:00");
    }

    #[test]
    fn test_format() {
        let mut cache = TimestampCache::new(TimestampZone::Utc);
        assert_eq!(cache.at(BASE_MS + 250), "07-Mar-2024 14:32:09");
        assert_eq!(cache.mark_ms(), BASE_MS);
    }

    #[test]
    fn test_same_second_is_cached() {
        let mut cache = TimestampCache::new(TimestampZone::Utc);
        let first = cache.at(BASE_MS + 10).to_string();
        let second = cache.at(BASE_MS + 999).to_string();
        assert_eq!(first, second);
        assert_eq!(cache.mark_ms(), BASE_MS);
    }

    #[test]
    fn test_next_second_refreshes() {
        let mut cache = TimestampCache::new(TimestampZone::Utc);
        cache.at(BASE_MS + 500);
        assert_eq!(cache.at(BASE_MS + 1000), "07-Mar-2024 14:32:10");
        assert_eq!(cache.mark_ms(), BASE_MS + 1000);
    }

    #[test]
    fn test_refresh_truncates_to_second() {
        let mut cache = TimestampCache::new(TimestampZone::Utc);
        cache.at(BASE_MS + 61_789);
        assert_eq!(cache.mark_ms(), BASE_MS + 61_000);
        assert_eq!(cache.at(BASE_MS + 61_999), "07-Mar-2024 14:33:10");
    }

    #[test]
    fn test_clock_going_backwards_keeps_cache() {
        let mut cache = TimestampCache::new(TimestampZone::Utc);
        cache.at(BASE_MS + 5_000);
        assert_eq!(cache.at(BASE_MS), "07-Mar-2024 14:32:14");
    }

    #[test]
    fn test_current_uses_wall_clock() {
        let mut cache = TimestampCache::new(TimestampZone::Local);
        let before = Utc::now().timestamp_millis();
        let rendered = cache.current().to_string();
        assert!(cache.mark_ms() > before - 1000);
        assert_eq!(rendered.len(), "07-Mar-2024 14:32:09".len());
    }
}
