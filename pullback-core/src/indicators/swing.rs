//! Swing-low structure detection.
//!
//! A swing low is a bar whose low is strictly below the `strength` lows on each
//! side of it. Within the trailing `lookback` bars, the structure qualifies
//! when the most recent swing low is higher than the one before it (a
//! higher low); the most recent swing low is then returned.

use super::IndicatorError;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct SwingLow {
    lookback: usize,
    strength: usize,
}

impl SwingLow {
    pub fn new(lookback: usize, strength: usize) -> Result<Self, IndicatorError> {
        // Two swings need at least 2*strength + 2 bars between them and the edges.
        if strength == 0 || lookback < 2 * strength + 2 {
            return Err(IndicatorError::InvalidSwingWindow { lookback, strength });
        }
        Ok(Self { lookback, strength })
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Most recent higher-low swing in the trailing window.
    ///
    /// `Ok(None)` means the pattern is absent; it is never reported as zero.
    pub fn find(&self, bars: &[Bar]) -> Result<Option<f64>, IndicatorError> {
        if bars.len() < self.lookback {
            return Err(IndicatorError::InsufficientData {
                indicator: "swing_low".to_string(),
                required: self.lookback,
                available: bars.len(),
            });
        }
        let lows: Vec<f64> = bars[bars.len() - self.lookback..]
            .iter()
            .map(|b| b.low)
            .collect();

        let swings = swing_low_indices(&lows, self.strength);
        match swings.as_slice() {
            [.., prev, last] if lows[*last] > lows[*prev] => Ok(Some(lows[*last])),
            _ => Ok(None),
        }
    }
}

/// Indices of strict local minima with `strength` neighbours on each side.
pub fn swing_low_indices(lows: &[f64], strength: usize) -> Vec<usize> {
    if lows.len() < 2 * strength + 1 {
        return Vec::new();
    }
    (strength..lows.len() - strength)
        .filter(|&i| {
            let low = lows[i];
            (1..=strength).all(|k| low < lows[i - k] && low < lows[i + k])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;
    use chrono::{Duration, TimeZone, Utc};

    fn bars_from_lows(lows: &[f64]) -> Vec<Bar> {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        lows.iter()
            .enumerate()
            .map(|(i, &low)| Bar {
                timestamp: base + Duration::minutes(5 * i as i64),
                open: low + 0.0004,
                high: low + 0.0008,
                low,
                close: low + 0.0005,
                volume: 500.0,
            })
            .collect()
    }

    #[test]
    fn finds_strict_local_minima() {
        let lows = [5.0, 4.0, 3.0, 4.0, 5.0, 4.5, 3.5, 4.5, 5.0];
        assert_eq!(swing_low_indices(&lows, 2), vec![2, 6]);
    }

    #[test]
    fn equal_neighbours_are_not_swings() {
        let lows = [5.0, 4.0, 3.0, 3.0, 4.0, 5.0];
        assert!(swing_low_indices(&lows, 2).is_empty());
    }

    #[test]
    fn higher_low_returns_most_recent_swing() {
        let lows = [
            1.1050, 1.1045, 1.1030, 1.1044, 1.1050, 1.1048, 1.1040, 1.1046, 1.1052, 1.1055,
        ];
        let swing = SwingLow::new(10, 2).unwrap();
        assert_eq!(swing.find(&bars_from_lows(&lows)).unwrap(), Some(1.1040));
    }

    #[test]
    fn lower_low_is_not_found() {
        let lows = [
            1.1050, 1.1045, 1.1040, 1.1044, 1.1050, 1.1048, 1.1030, 1.1046, 1.1052, 1.1055,
        ];
        let swing = SwingLow::new(10, 2).unwrap();
        assert_eq!(swing.find(&bars_from_lows(&lows)).unwrap(), None);
    }

    #[test]
    fn single_swing_is_not_found() {
        let lows = [1.2, 1.1, 1.0, 1.1, 1.2, 1.3, 1.4, 1.5];
        let swing = SwingLow::new(8, 2).unwrap();
        assert_eq!(swing.find(&bars_from_lows(&lows)).unwrap(), None);
    }

    #[test]
    fn only_trailing_window_is_scanned() {
        // Qualifying pattern sits before the window; the window itself is a steady rise.
        let mut lows = vec![
            1.1050, 1.1045, 1.1030, 1.1044, 1.1050, 1.1048, 1.1040, 1.1046, 1.1052,
        ];
        lows.extend((0..10).map(|i| 1.1060 + i as f64 * 0.0002));
        let swing = SwingLow::new(10, 2).unwrap();
        assert_eq!(swing.find(&bars_from_lows(&lows)).unwrap(), None);
    }

    #[test]
    fn short_input_is_insufficient_data() {
        let swing = SwingLow::new(20, 2).unwrap();
        let err = swing.find(&make_bars(&[1.0; 10])).unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::InsufficientData { required: 20, available: 10, .. }
        ));
    }

    #[test]
    fn rejects_degenerate_window() {
        assert!(SwingLow::new(5, 2).is_err());
        assert!(SwingLow::new(20, 0).is_err());
        assert!(SwingLow::new(6, 2).is_ok());
    }
}
