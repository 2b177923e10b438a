//! Stop-loss and take-profit levels for a long entry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error("non-positive risk distance: entry {entry} <= stop loss {stop_loss}")]
    NonPositiveRisk { entry: f64, stop_loss: f64 },
    #[error("non-finite risk input (entry {entry}, atr {atr}, swing low {swing_low})")]
    NonFinite { entry: f64, atr: f64, swing_low: f64 },
}

/// Price levels of an accepted long.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// `entry - stop_loss`, strictly positive.
    pub risk_distance: f64,
    pub risk_pips: f64,
    /// `entry - atr * atr_stop_multiplier`.
    pub atr_stop: f64,
    /// The swing low the structural stop came from.
    pub structural_stop: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskCalculator {
    pub atr_stop_multiplier: f64,
    pub risk_reward_ratio: f64,
    pub pip_size: f64,
}

impl RiskCalculator {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            atr_stop_multiplier: config.atr_stop_multiplier,
            risk_reward_ratio: config.risk_reward_ratio,
            pip_size: config.pip_size,
        }
    }

    /// Stop at the higher of the structural and volatility stops.
    pub fn levels(&self, entry: f64, atr: f64, swing_low: f64) -> Result<RiskLevels, RiskError> {
        if !(entry.is_finite() && atr.is_finite() && swing_low.is_finite()) {
            return Err(RiskError::NonFinite {
                entry,
                atr,
                swing_low,
            });
        }

        let atr_stop = entry - atr * self.atr_stop_multiplier;
        let stop_loss = swing_low.max(atr_stop);
        let risk_distance = entry - stop_loss;
        if risk_distance <= 0.0 {
            return Err(RiskError::NonPositiveRisk { entry, stop_loss });
        }

        Ok(RiskLevels {
            entry,
            stop_loss,
            take_profit: entry + risk_distance * self.risk_reward_ratio,
            risk_distance,
            risk_pips: risk_distance / self.pip_size,
            atr_stop,
            structural_stop: swing_low,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> RiskCalculator {
        RiskCalculator::from_config(&EngineConfig::default())
    }

    #[test]
    fn structural_stop_wins_when_higher() {
        let levels = calculator().levels(1.10500, 0.00082, 1.10420).unwrap();
        assert!((levels.stop_loss - 1.10420).abs() < 1e-9);
        assert!((levels.take_profit - 1.10660).abs() < 1e-9);
        assert!((levels.risk_pips - 8.0).abs() < 1e-6);
        assert!((levels.atr_stop - 1.10418).abs() < 1e-9);
    }

    #[test]
    fn atr_stop_wins_when_higher() {
        let levels = calculator().levels(1.10500, 0.00050, 1.10300).unwrap();
        assert!((levels.stop_loss - 1.10450).abs() < 1e-9);
        assert!((levels.risk_pips - 5.0).abs() < 1e-6);
        assert!((levels.take_profit - 1.10600).abs() < 1e-9);
    }

    #[test]
    fn swing_low_at_entry_is_an_error() {
        let err = calculator().levels(1.10500, 0.00082, 1.10500).unwrap_err();
        assert!(matches!(err, RiskError::NonPositiveRisk { .. }));
    }

    #[test]
    fn swing_low_above_entry_is_an_error() {
        assert!(calculator().levels(1.10500, 0.00082, 1.10600).is_err());
    }

    #[test]
    fn nan_input_is_an_error() {
        let err = calculator().levels(1.10500, f64::NAN, 1.10400).unwrap_err();
        assert!(matches!(err, RiskError::NonFinite { .. }));
    }

    #[test]
    fn reward_ratio_is_exact() {
        let calc = RiskCalculator {
            risk_reward_ratio: 3.0,
            ..calculator()
        };
        let levels = calc.levels(1.2500, 0.0010, 1.2480).unwrap();
        let ratio = (levels.take_profit - levels.entry) / (levels.entry - levels.stop_loss);
        assert!((ratio - 3.0).abs() < 1e-9);
    }
}
