//! Engine configuration.
//!
//! One immutable struct, validated once when the engine is built. Thresholds
//! that make a pass impossible are rejected here rather than discovered
//! mid-evaluation.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Timeframe;
use crate::session::{default_sessions, SessionWindow};

/// Configuration errors found by `EngineConfig::validate`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("symbol must not be empty")]
    EmptySymbol,
    #[error("{field} must be >= 1 (got {value})")]
    InvalidPeriod { field: &'static str, value: usize },
    #[error("ema_fast ({fast}) must be shorter than ema_slow ({slow})")]
    EmaOrder { fast: usize, slow: usize },
    #[error("RSI bounds must satisfy 0 <= rsi_lower <= rsi_upper <= 100 (got {lower}-{upper})")]
    RsiBounds { lower: f64, upper: f64 },
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("at least one session window is required")]
    NoSessions,
    #[error("session window {index} has no name")]
    UnnamedSession { index: usize },
    #[error("swing_lookback ({lookback}) must be >= 2 * swing_strength + 2 with swing_strength >= 1 (strength {strength})")]
    SwingWindow { lookback: usize, strength: usize },
    #[error("min_bars_required ({configured}) is below the {required} bars the indicators need")]
    MinBarsTooLow { configured: usize, required: usize },
}

/// All knobs of the decision engine.
///
/// Defaults are the reference EURUSD M5 parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub symbol: String,
    pub timeframe: Timeframe,

    // Indicator periods
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    /// Lookback bars for the rolling VWAP.
    pub vwap_period: usize,
    pub swing_lookback: usize,
    /// Neighbours required on each side of a swing low.
    pub swing_strength: usize,

    // Filter thresholds
    pub rsi_lower: f64,
    pub rsi_upper: f64,
    /// Minimum ATR, in price units.
    pub min_atr_multiplier: f64,
    pub max_spread_pips: f64,

    // Risk
    pub risk_reward_ratio: f64,
    pub atr_stop_multiplier: f64,
    pub pip_size: f64,

    // Gating
    pub sessions: Vec<SessionWindow>,
    pub cooldown_minutes: u32,
    pub news_filter_enabled: bool,
    pub min_bars_required: usize,
    /// Skip indicator work when the cooldown is still active.
    pub cooldown_short_circuit: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: "EURUSD".to_string(),
            timeframe: Timeframe::M5,
            ema_fast: 20,
            ema_slow: 50,
            rsi_period: 14,
            atr_period: 14,
            vwap_period: 100,
            swing_lookback: 20,
            swing_strength: 2,
            rsi_lower: 50.0,
            rsi_upper: 70.0,
            min_atr_multiplier: 0.0001,
            max_spread_pips: 2.0,
            risk_reward_ratio: 2.0,
            atr_stop_multiplier: 1.0,
            pip_size: 0.0001,
            sessions: default_sessions(),
            cooldown_minutes: 30,
            news_filter_enabled: true,
            min_bars_required: 200,
            cooldown_short_circuit: true,
        }
    }
}

impl EngineConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::minutes(i64::from(self.cooldown_minutes))
    }

    /// Fewest bars for which every indicator yields a value at the last bar.
    pub fn indicator_bars_needed(&self) -> usize {
        [
            self.ema_fast,
            self.ema_slow,
            self.rsi_period + 1,
            self.atr_period + 1,
            self.vwap_period,
            self.swing_lookback,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }

        for (field, value) in [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("rsi_period", self.rsi_period),
            ("atr_period", self.atr_period),
            ("vwap_period", self.vwap_period),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidPeriod { field, value });
            }
        }
        if self.ema_fast >= self.ema_slow {
            return Err(ConfigError::EmaOrder {
                fast: self.ema_fast,
                slow: self.ema_slow,
            });
        }

        let rsi_ok = (0.0..=100.0).contains(&self.rsi_lower)
            && (0.0..=100.0).contains(&self.rsi_upper)
            && self.rsi_lower <= self.rsi_upper;
        if !rsi_ok {
            return Err(ConfigError::RsiBounds {
                lower: self.rsi_lower,
                upper: self.rsi_upper,
            });
        }

        for (field, value) in [
            ("risk_reward_ratio", self.risk_reward_ratio),
            ("atr_stop_multiplier", self.atr_stop_multiplier),
            ("pip_size", self.pip_size),
        ] {
            // NaN fails this comparison too.
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        for (field, value) in [
            ("min_atr_multiplier", self.min_atr_multiplier),
            ("max_spread_pips", self.max_spread_pips),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.sessions.is_empty() {
            return Err(ConfigError::NoSessions);
        }
        if let Some(index) = self.sessions.iter().position(|s| s.name.trim().is_empty()) {
            return Err(ConfigError::UnnamedSession { index });
        }

        if self.swing_strength == 0 || self.swing_lookback < 2 * self.swing_strength + 2 {
            return Err(ConfigError::SwingWindow {
                lookback: self.swing_lookback,
                strength: self.swing_strength,
            });
        }

        let required = self.indicator_bars_needed();
        if self.min_bars_required < required {
            return Err(ConfigError::MinBarsTooLow {
                configured: self.min_bars_required,
                required,
            });
        }

        Ok(())
    }
}
