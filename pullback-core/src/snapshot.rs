//! Per-evaluation indicator snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::Bar;
use crate::indicators::{Atr, Ema, Indicator, IndicatorError, Rsi, SwingLow, Vwap};

/// Scalar indicator values at the most recent bar of a window.
///
/// Built once per evaluation and owned by the resulting `SignalResult`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub atr: f64,
    pub vwap: f64,
    /// `None` when no higher-low structure exists in the lookback.
    pub swing_low: Option<f64>,
    pub current_price: f64,
    pub current_time: DateTime<Utc>,
}

impl IndicatorSnapshot {
    /// Compute every indicator over `bars` with the configured periods.
    pub fn compute(bars: &[Bar], config: &EngineConfig) -> Result<Self, IndicatorError> {
        let last = bars.last().ok_or_else(|| IndicatorError::InsufficientData {
            indicator: "snapshot".to_string(),
            required: 1,
            available: 0,
        })?;

        Ok(Self {
            ema_fast: Ema::new(config.ema_fast)?.latest(bars)?,
            ema_slow: Ema::new(config.ema_slow)?.latest(bars)?,
            rsi: Rsi::new(config.rsi_period)?.latest(bars)?,
            atr: Atr::new(config.atr_period)?.latest(bars)?,
            vwap: Vwap::new(config.vwap_period)?.latest(bars)?,
            swing_low: SwingLow::new(config.swing_lookback, config.swing_strength)?.find(bars)?,
            current_price: last.close,
            current_time: last.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn small_config() -> EngineConfig {
        EngineConfig {
            ema_fast: 3,
            ema_slow: 5,
            rsi_period: 3,
            atr_period: 3,
            vwap_period: 4,
            swing_lookback: 6,
            swing_strength: 2,
            min_bars_required: 6,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn snapshot_reads_last_bar() {
        let bars = make_bars(&[1.10, 1.11, 1.12, 1.11, 1.13, 1.14, 1.15]);
        let snap = IndicatorSnapshot::compute(&bars, &small_config()).unwrap();
        assert_eq!(snap.current_price, 1.15);
        assert_eq!(snap.current_time, bars[6].timestamp);
        assert!(snap.ema_fast > snap.ema_slow);
        assert!(snap.atr > 0.0);
    }

    #[test]
    fn snapshot_propagates_insufficient_data() {
        let bars = make_bars(&[1.10, 1.11, 1.12]);
        let err = IndicatorSnapshot::compute(&bars, &small_config()).unwrap_err();
        assert!(matches!(err, IndicatorError::InsufficientData { .. }));
    }

    #[test]
    fn snapshot_of_empty_window_is_insufficient() {
        let err = IndicatorSnapshot::compute(&[], &small_config()).unwrap_err();
        assert!(matches!(err, IndicatorError::InsufficientData { available: 0, .. }));
    }

    #[test]
    fn snapshot_is_deterministic() {
        let bars = make_bars(&[1.10, 1.11, 1.12, 1.11, 1.13, 1.14, 1.15]);
        let a = IndicatorSnapshot::compute(&bars, &small_config()).unwrap();
        let b = IndicatorSnapshot::compute(&bars, &small_config()).unwrap();
        assert_eq!(a, b);
    }
}
