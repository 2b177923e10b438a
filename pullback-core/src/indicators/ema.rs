//! Exponential moving average of closes, alpha = 2 / (period + 1).
//!
//! The first value, at index `period - 1`, is the simple mean of the first
//! `period` closes.

use super::smoothing::{ema_alpha, seeded_smooth};
use super::{check_period, Indicator, IndicatorError};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    label: String,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("ema", period)?;
        Ok(Self {
            period,
            label: format!("ema_{period}"),
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.label
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        seeded_smooth(&closes, self.period, 0, ema_alpha(self.period))
    }
}
