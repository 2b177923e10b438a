//! Relative strength index with Wilder-smoothed average gain and loss.
//!
//! A window with no losses reads 100, flat windows included.

use super::smoothing::{seeded_smooth, wilder_alpha};
use super::{check_period, Indicator, IndicatorError};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    label: String,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("rsi", period)?;
        Ok(Self {
            period,
            label: format!("rsi_{period}"),
        })
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.label
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let (gains, losses): (Vec<f64>, Vec<f64>) = std::iter::once((f64::NAN, f64::NAN))
            .chain(bars.windows(2).map(|pair| {
                let change = pair[1].close - pair[0].close;
                (change.max(0.0), (-change).max(0.0))
            }))
            .take(bars.len())
            .unzip();

        let alpha = wilder_alpha(self.period);
        let avg_gain = seeded_smooth(&gains, self.period, 1, alpha);
        let avg_loss = seeded_smooth(&losses, self.period, 1, alpha);
        avg_gain
            .into_iter()
            .zip(avg_loss)
            .map(|(gain, loss)| strength_index(gain, loss))
            .collect()
    }
}

fn strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
