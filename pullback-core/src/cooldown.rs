//! Cooldown tracker: the engine's only mutable state.

use chrono::{DateTime, Duration, Utc};

/// Timestamp of the last accepted signal.
///
/// Written only by `SignalEngine`, once per accepted signal. Construct a fresh
/// tracker per test case; nothing here is global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownTracker {
    last_signal: Option<DateTime<Utc>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known last-signal time (e.g. restored from a journal).
    pub fn starting_at(last_signal: DateTime<Utc>) -> Self {
        Self {
            last_signal: Some(last_signal),
        }
    }

    pub fn last_signal(&self) -> Option<DateTime<Utc>> {
        self.last_signal
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_signal.map(|last| now - last)
    }

    /// True while `now - last_signal < cooldown`. Exactly `cooldown` is elapsed.
    pub fn is_active(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        self.elapsed(now).is_some_and(|e| e < cooldown)
    }

    /// Time left before the next signal may be accepted; zero when inactive.
    pub fn remaining(&self, now: DateTime<Utc>, cooldown: Duration) -> Duration {
        match self.elapsed(now) {
            Some(elapsed) if elapsed < cooldown => cooldown - elapsed,
            _ => Duration::zero(),
        }
    }

    pub(crate) fn record(&mut self, at: DateTime<Utc>) {
        self.last_signal = Some(at);
    }

    pub fn reset(&mut self) {
        self.last_signal = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 10, minute, 0).unwrap()
    }

    #[test]
    fn fresh_tracker_is_never_active() {
        let tracker = CooldownTracker::new();
        assert!(!tracker.is_active(t(0), Duration::minutes(30)));
        assert_eq!(tracker.remaining(t(0), Duration::minutes(30)), Duration::zero());
        assert_eq!(tracker.elapsed(t(0)), None);
    }

    #[test]
    fn active_until_full_duration_elapsed() {
        let mut tracker = CooldownTracker::new();
        tracker.record(t(0));
        let cooldown = Duration::minutes(30);
        assert!(tracker.is_active(t(29), cooldown));
        assert_eq!(tracker.remaining(t(20), cooldown), Duration::minutes(10));
        assert!(!tracker.is_active(t(30), cooldown));
        assert!(!tracker.is_active(t(45), cooldown));
    }

    #[test]
    fn clock_moving_backwards_stays_active() {
        let tracker = CooldownTracker::starting_at(t(30));
        assert!(tracker.is_active(t(10), Duration::minutes(30)));
    }

    #[test]
    fn reset_clears_state() {
        let mut tracker = CooldownTracker::starting_at(t(0));
        tracker.reset();
        assert_eq!(tracker.last_signal(), None);
        assert!(!tracker.is_active(t(1), Duration::minutes(30)));
    }
}
