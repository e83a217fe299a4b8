//! Last-activity bookkeeping for the idle-timeout decision.

/// Tracks the epoch timestamp of the last detected change.
///
/// Seeded from the persisted config's `last_update` so idle time survives
/// a daemon restart. Updated only when a cycle actually found changes;
/// failed cycles leave it untouched.
#[derive(Debug, Clone, Copy)]
pub struct ActivityTracker {
    last_update: i64,
}

impl ActivityTracker {
    pub const fn new(last_update: i64) -> Self {
        Self { last_update }
    }

    /// Overwrite the last-activity timestamp unconditionally.
    pub const fn mark_active(&mut self, now: i64) {
        self.last_update = now;
    }

    /// Whole seconds since the last activity, clamped at zero.
    pub fn idle_seconds(&self, now: i64) -> u64 {
        u64::try_from(now - self.last_update).unwrap_or(0)
    }

    pub const fn last_update(&self) -> i64 {
        self.last_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_grows_monotonically_without_activity() {
        let tracker = ActivityTracker::new(100);
        assert_eq!(tracker.idle_seconds(100), 0);
        assert_eq!(tracker.idle_seconds(130), 30);
        assert!(tracker.idle_seconds(131) >= tracker.idle_seconds(130));
    }

    #[test]
    fn mark_active_resets_idle() {
        let mut tracker = ActivityTracker::new(0);
        assert_eq!(tracker.idle_seconds(500), 500);
        tracker.mark_active(500);
        assert_eq!(tracker.idle_seconds(500), 0);
        assert_eq!(tracker.idle_seconds(560), 60);
    }

    #[test]
    fn idle_never_negative() {
        let tracker = ActivityTracker::new(1000);
        assert_eq!(tracker.idle_seconds(900), 0);
    }
}
