//! Bar and BarSeries, the market data the engine evaluates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for the configured symbol and timeframe.
///
/// Volume is tick volume for FX venues, so it is carried as `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Typical price `(high + low + close) / 3`, used by VWAP.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Returns true if any OHLCV field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite())
    }

    /// Basic OHLCV sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }
}

/// Reasons a bar sequence cannot become a `BarSeries`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar series is empty")]
    Empty,
    #[error("bar {index} ({timestamp}) has non-finite fields")]
    Void {
        index: usize,
        timestamp: DateTime<Utc>,
    },
    #[error("bar {index} ({timestamp}) has inconsistent OHLC values")]
    Inconsistent {
        index: usize,
        timestamp: DateTime<Utc>,
    },
    #[error("bar {index} timestamp {timestamp} does not follow {previous}")]
    NotIncreasing {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },
}

/// Ordered bars, most recent last.
///
/// Construction guarantees: non-empty, every bar sane, timestamps strictly
/// increasing. Any contiguous slice of a series keeps those guarantees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, BarError> {
        if bars.is_empty() {
            return Err(BarError::Empty);
        }
        for (index, bar) in bars.iter().enumerate() {
            if bar.is_void() {
                return Err(BarError::Void {
                    index,
                    timestamp: bar.timestamp,
                });
            }
            if !bar.is_sane() {
                return Err(BarError::Inconsistent {
                    index,
                    timestamp: bar.timestamp,
                });
            }
            if index > 0 {
                let previous = bars[index - 1].timestamp;
                if bar.timestamp <= previous {
                    return Err(BarError::NotIncreasing {
                        index,
                        timestamp: bar.timestamp,
                        previous,
                    });
                }
            }
        }
        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false: construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    /// Most recent bar.
    pub fn last(&self) -> &Bar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    /// Trailing window of at most `len` bars ending at (and including) `end`.
    ///
    /// Returns `None` if `end` is out of range.
    pub fn window(&self, end: usize, len: usize) -> Option<&[Bar]> {
        if end >= self.bars.len() {
            return None;
        }
        let start = (end + 1).saturating_sub(len);
        Some(&self.bars[start..=end])
    }
}
