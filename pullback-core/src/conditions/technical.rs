//! Indicator-driven conditions: trend, momentum, VWAP, volatility, structure.
//!
//! Every comparison is written so that a NaN input fails.

use super::{Condition, ConditionContext, ConditionName, ConditionResult};

/// `ema_fast > ema_slow` and price above both.
#[derive(Debug, Clone, Copy)]
pub struct TrendCondition {
    fast_period: usize,
    slow_period: usize,
}

impl TrendCondition {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
        }
    }
}

impl Condition for TrendCondition {
    fn name(&self) -> ConditionName {
        ConditionName::Trend
    }

    fn check(&self, ctx: &ConditionContext<'_>) -> ConditionResult {
        let s = ctx.snapshot;
        let uptrend = s.ema_fast > s.ema_slow
            && s.current_price > s.ema_fast
            && s.current_price > s.ema_slow;
        if uptrend {
            ConditionResult::pass(
                ConditionName::Trend,
                format!(
                    "Uptrend confirmed (EMA{} > EMA{}, price above both)",
                    self.fast_period, self.slow_period
                ),
            )
        } else {
            ConditionResult::fail(
                ConditionName::Trend,
                format!(
                    "No uptrend (EMA{}={:.5}, EMA{}={:.5}, Price={:.5})",
                    self.fast_period, s.ema_fast, self.slow_period, s.ema_slow, s.current_price
                ),
            )
        }
    }
}

/// `rsi_lower <= rsi <= rsi_upper`.
#[derive(Debug, Clone, Copy)]
pub struct MomentumCondition {
    lower: f64,
    upper: f64,
}

impl MomentumCondition {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }
}

impl Condition for MomentumCondition {
    fn name(&self) -> ConditionName {
        ConditionName::Momentum
    }

    fn check(&self, ctx: &ConditionContext<'_>) -> ConditionResult {
        let rsi = ctx.snapshot.rsi;
        if self.lower <= rsi && rsi <= self.upper {
            ConditionResult::pass(
                ConditionName::Momentum,
                format!("RSI healthy at {rsi:.1} (range {}-{})", self.lower, self.upper),
            )
        } else {
            ConditionResult::fail(
                ConditionName::Momentum,
                format!("RSI out of range ({rsi:.1} not in {}-{})", self.lower, self.upper),
            )
        }
    }
}

/// Price strictly above the rolling VWAP.
#[derive(Debug, Clone, Copy)]
pub struct InstitutionalCondition;

impl Condition for InstitutionalCondition {
    fn name(&self) -> ConditionName {
        ConditionName::Institutional
    }

    fn check(&self, ctx: &ConditionContext<'_>) -> ConditionResult {
        let price = ctx.snapshot.current_price;
        let vwap = ctx.snapshot.vwap;
        if price > vwap {
            ConditionResult::pass(
                ConditionName::Institutional,
                format!("Price above VWAP ({price:.5} > {vwap:.5})"),
            )
        } else {
            ConditionResult::fail(
                ConditionName::Institutional,
                format!("Price not above VWAP ({price:.5} <= {vwap:.5})"),
            )
        }
    }
}

/// ATR at or above a floor expressed in price units.
#[derive(Debug, Clone, Copy)]
pub struct VolatilityCondition {
    min_atr: f64,
}

impl VolatilityCondition {
    pub fn new(min_atr: f64) -> Self {
        Self { min_atr }
    }
}

impl Condition for VolatilityCondition {
    fn name(&self) -> ConditionName {
        ConditionName::Volatility
    }

    fn check(&self, ctx: &ConditionContext<'_>) -> ConditionResult {
        let atr = ctx.snapshot.atr;
        if atr >= self.min_atr {
            ConditionResult::pass(
                ConditionName::Volatility,
                format!("ATR shows sufficient volatility ({atr:.5} >= {})", self.min_atr),
            )
        } else {
            ConditionResult::fail(
                ConditionName::Volatility,
                format!("ATR too low ({atr:.5} < {})", self.min_atr),
            )
        }
    }
}

/// A higher-low swing exists in the lookback.
#[derive(Debug, Clone, Copy)]
pub struct StructureCondition;

impl Condition for StructureCondition {
    fn name(&self) -> ConditionName {
        ConditionName::Structure
    }

    fn check(&self, ctx: &ConditionContext<'_>) -> ConditionResult {
        match ctx.snapshot.swing_low {
            Some(low) if low.is_finite() => ConditionResult::pass(
                ConditionName::Structure,
                format!("Higher low pattern confirmed at {low:.5}"),
            ),
            _ => ConditionResult::fail(
                ConditionName::Structure,
                "No valid higher low pattern detected",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::test_support::*;
    use crate::snapshot::IndicatorSnapshot;

    fn run(cond: &dyn Condition, snapshot: IndicatorSnapshot) -> ConditionResult {
        let quote = tight_quote();
        cond.check(&ConditionContext {
            snapshot: &snapshot,
            quote: &quote,
            now: london_noon(),
            last_signal: None,
        })
    }

    #[test]
    fn trend_requires_price_above_both_averages() {
        let cond = TrendCondition::new(20, 50);
        assert!(run(&cond, passing_snapshot()).passed);

        let below_fast = IndicatorSnapshot {
            current_price: 1.10470,
            ..passing_snapshot()
        };
        let r = run(&cond, below_fast);
        assert!(!r.passed);
        assert_eq!(r.detail, "No uptrend (EMA20=1.10480, EMA50=1.10420, Price=1.10470)");

        let crossed = IndicatorSnapshot {
            ema_fast: 1.10400,
            ..passing_snapshot()
        };
        assert!(!run(&cond, crossed).passed);
    }

    #[test]
    fn momentum_reports_out_of_range_value() {
        let cond = MomentumCondition::new(50.0, 70.0);
        let r = run(
            &cond,
            IndicatorSnapshot {
                rsi: 72.4,
                ..passing_snapshot()
            },
        );
        assert!(!r.passed);
        assert_eq!(r.detail, "RSI out of range (72.4 not in 50-70)");
    }

    #[test]
    fn momentum_bounds_are_inclusive() {
        let cond = MomentumCondition::new(50.0, 70.0);
        for rsi in [50.0, 70.0] {
            let snap = IndicatorSnapshot {
                rsi,
                ..passing_snapshot()
            };
            assert!(run(&cond, snap).passed, "rsi {rsi}");
        }
    }

    #[test]
    fn vwap_requires_strictly_above() {
        let at_vwap = IndicatorSnapshot {
            vwap: 1.10500,
            ..passing_snapshot()
        };
        assert!(!run(&InstitutionalCondition, at_vwap).passed);
        assert!(run(&InstitutionalCondition, passing_snapshot()).passed);
    }

    #[test]
    fn volatility_floor_is_inclusive() {
        let cond = VolatilityCondition::new(0.00082);
        assert!(run(&cond, passing_snapshot()).passed);
        let quiet = IndicatorSnapshot {
            atr: 0.00005,
            ..passing_snapshot()
        };
        let r = run(&VolatilityCondition::new(0.0001), quiet);
        assert!(!r.passed);
        assert_eq!(r.detail, "ATR too low (0.00005 < 0.0001)");
    }

    #[test]
    fn missing_swing_low_fails_structure() {
        let r = run(
            &StructureCondition,
            IndicatorSnapshot {
                swing_low: None,
                ..passing_snapshot()
            },
        );
        assert!(!r.passed);
        assert_eq!(r.detail, "No valid higher low pattern detected");
    }

    #[test]
    fn nan_indicators_fail() {
        let snap = IndicatorSnapshot {
            rsi: f64::NAN,
            atr: f64::NAN,
            vwap: f64::NAN,
            ema_fast: f64::NAN,
            ..passing_snapshot()
        };
        assert!(!run(&MomentumCondition::new(50.0, 70.0), snap).passed);
        assert!(!run(&VolatilityCondition::new(0.0001), snap).passed);
        assert!(!run(&InstitutionalCondition, snap).passed);
        assert!(!run(&TrendCondition::new(20, 50), snap).passed);
    }
}
