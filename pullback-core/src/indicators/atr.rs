//! Average true range, Wilder-smoothed.
//!
//! The first bar has no previous close, so its true range is undefined and
//! the first ATR value lands at index `period`.

use super::smoothing::{seeded_smooth, wilder_alpha};
use super::{check_period, Indicator, IndicatorError};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    label: String,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("atr", period)?;
        Ok(Self {
            period,
            label: format!("atr_{period}"),
        })
    }
}

/// Per-bar true range; NaN at index 0.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    std::iter::once(f64::NAN)
        .chain(bars.windows(2).map(|pair| {
            let (prev_close, bar) = (pair[0].close, &pair[1]);
            (bar.high - bar.low)
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        }))
        .take(bars.len())
        .collect()
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.label
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        seeded_smooth(&true_range(bars), self.period, 1, wilder_alpha(self.period))
    }
}
