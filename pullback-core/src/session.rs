//! Trading session windows (UTC wall-clock time of day).

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A named time-of-day window, inclusive at both ends.
///
/// When `start > end` the window wraps midnight (e.g. 21:00–06:00).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SessionWindow {
    pub fn new(name: impl Into<String>, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }

    pub fn contains_instant(&self, at: DateTime<Utc>) -> bool {
        self.contains(at.time())
    }
}

/// Names of every window containing `at`, in configuration order.
pub fn matching_sessions(windows: &[SessionWindow], at: DateTime<Utc>) -> Vec<String> {
    windows
        .iter()
        .filter(|w| w.contains_instant(at))
        .map(|w| w.name.clone())
        .collect()
}

/// Format a UTC instant's time of day as `HH:MM`.
pub fn clock_label(at: DateTime<Utc>) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}

/// The London and New York windows used by default.
pub fn default_sessions() -> Vec<SessionWindow> {
    vec![
        SessionWindow::new("LONDON", hm(7, 0), hm(16, 0)),
        SessionWindow::new("NEW_YORK", hm(12, 0), hm(21, 0)),
    ]
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, hour, minute, 0).unwrap()
    }

    #[test]
    fn inclusive_bounds() {
        let london = &default_sessions()[0];
        assert!(london.contains_instant(at(7, 0)));
        assert!(london.contains_instant(at(16, 0)));
        assert!(!london.contains_instant(at(6, 59)));
        assert!(!london.contains_instant(at(16, 1)));
    }

    #[test]
    fn overlap_reports_both_windows() {
        let sessions = default_sessions();
        assert_eq!(
            matching_sessions(&sessions, at(13, 30)),
            vec!["LONDON".to_string(), "NEW_YORK".to_string()]
        );
        assert_eq!(matching_sessions(&sessions, at(9, 0)), vec!["LONDON".to_string()]);
        assert!(matching_sessions(&sessions, at(22, 0)).is_empty());
    }

    #[test]
    fn wrapping_window() {
        let sydney = SessionWindow::new("SYDNEY", hm(21, 0), hm(6, 0));
        assert!(sydney.contains_instant(at(23, 15)));
        assert!(sydney.contains_instant(at(3, 0)));
        assert!(!sydney.contains_instant(at(12, 0)));
    }

    #[test]
    fn clock_label_is_zero_padded() {
        assert_eq!(clock_label(at(7, 5)), "07:05");
    }

    #[test]
    fn deserializes_from_toml() {
        let w: SessionWindow =
            toml::from_str("name = \"TOKYO\"\nstart = \"00:00:00\"\nend = \"09:00:00\"").unwrap();
        assert_eq!(w.name, "TOKYO");
        assert_eq!(w.end, hm(9, 0));
    }
}
