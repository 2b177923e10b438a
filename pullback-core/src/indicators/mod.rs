//! Indicator library.
//!
//! Indicators are pure functions: bar history in, numeric series out. Each
//! evaluation recomputes them over the window it is handed; nothing is cached
//! between calls and nothing reads the clock.
//!
//! Seeding conventions are fixed and covered by tests:
//! - EMA is seeded with the SMA of the first `period` closes.
//! - RSI and ATR are seeded with a simple mean over the first `period`
//!   samples, then Wilder-smoothed (alpha = 1/period).

pub mod atr;
pub mod ema;
pub mod rsi;
pub mod smoothing;
pub mod swing;
pub mod vwap;

pub use atr::Atr;
pub use ema::Ema;
pub use rsi::Rsi;
pub use swing::SwingLow;
pub use vwap::Vwap;

use crate::domain::Bar;
use thiserror::Error;

/// Errors raised while computing an indicator value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("{indicator}: insufficient data (need {required} bars, have {available})")]
    InsufficientData {
        indicator: String,
        required: usize,
        available: usize,
    },
    #[error("{indicator}: period must be >= 1 (got {period})")]
    InvalidPeriod { indicator: String, period: usize },
    #[error("swing_low: lookback {lookback} too short for strength {strength}")]
    InvalidSwingWindow { lookback: usize, strength: usize },
    #[error("{indicator}: latest value is not finite")]
    NonFinite { indicator: String },
}

/// Trait for indicators.
///
/// Indicators take a bar series and produce a numeric output series of the
/// same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading bars that produce no value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;

    /// Minimum number of bars needed for a value at the last bar.
    fn required_bars(&self) -> usize {
        self.lookback() + 1
    }

    /// Value at the most recent bar.
    ///
    /// Too few bars is an error, never a computed zero.
    fn latest(&self, bars: &[Bar]) -> Result<f64, IndicatorError> {
        let required = self.required_bars();
        if bars.len() < required {
            return Err(IndicatorError::InsufficientData {
                indicator: self.name().to_string(),
                required,
                available: bars.len(),
            });
        }
        match self.compute(bars).last().copied() {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(IndicatorError::NonFinite {
                indicator: self.name().to_string(),
            }),
        }
    }
}

pub(crate) fn check_period(indicator: &str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod {
            indicator: indicator.to_string(),
            period,
        });
    }
    Ok(())
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 0.0005, low = min(open,close) - 0.0005, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::{Duration, TimeZone, Utc};
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + Duration::minutes(5 * i as i64),
                open,
                high: open.max(close) + 0.0005,
                low: open.min(close) - 0.0005,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
