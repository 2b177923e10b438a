//! Rolling Volume-Weighted Average Price (VWAP).
//!
//! VWAP[t] = Σ(typical·volume) / Σ(volume) over bars (t-period, t].
//! Each window is summed fresh, so this is not a cumulative session VWAP.
//! A window with zero total volume yields the bar's close.
//! Lookback: period - 1.

use super::{check_period, Indicator, IndicatorError};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Vwap {
    period: usize,
    name: String,
}

impl Vwap {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("vwap", period)?;
        Ok(Self {
            period,
            name: format!("vwap_{period}"),
        })
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &bars[i + 1 - self.period..=i];
            let (pv, volume) = window.iter().fold((0.0, 0.0), |(pv, vol), bar| {
                (pv + bar.typical_price() * bar.volume, vol + bar.volume)
            });
            result[i] = if volume > 0.0 { pv / volume } else { bars[i].close };
        }

        result
    }
}
