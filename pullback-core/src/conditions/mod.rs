//! Condition pipeline.
//!
//! Nine independent predicates, each producing a named pass/fail result with a
//! human-readable detail. The pipeline folds over all of them so a rejection
//! reports every failed condition, not just the first.
//!
//! Order: Cooldown, Spread, Session, News, Trend, Momentum, VWAP, Volatility,
//! Structure. Cooldown sits outside the list because the engine may consult it
//! before any indicator is computed.

pub mod gates;
pub mod technical;

pub use gates::{CooldownCondition, NewsCondition, SessionCondition, SpreadCondition};
pub use technical::{
    InstitutionalCondition, MomentumCondition, StructureCondition, TrendCondition,
    VolatilityCondition,
};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::Quote;
use crate::snapshot::IndicatorSnapshot;

/// Identity of a pipeline condition.
///
/// `Data` and `Indicators` are not predicates. They mark evaluations refused
/// for lack of history and for indicator values that came out undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConditionName {
    Data,
    Indicators,
    Cooldown,
    Spread,
    Session,
    News,
    Trend,
    Momentum,
    #[serde(rename = "VWAP")]
    Institutional,
    Volatility,
    Structure,
}

impl ConditionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "Data",
            Self::Indicators => "Indicators",
            Self::Cooldown => "Cooldown",
            Self::Spread => "Spread",
            Self::Session => "Session",
            Self::News => "News",
            Self::Trend => "Trend",
            Self::Momentum => "Momentum",
            Self::Institutional => "VWAP",
            Self::Volatility => "Volatility",
            Self::Structure => "Structure",
        }
    }
}

impl fmt::Display for ConditionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    pub name: ConditionName,
    pub passed: bool,
    pub detail: String,
}

impl ConditionResult {
    pub fn pass(name: ConditionName, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(name: ConditionName, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ConditionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "[{mark}] {}: {}", self.name, self.detail)
    }
}

/// Everything a condition may read. Conditions never see the tracker itself.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub snapshot: &'a IndicatorSnapshot,
    pub quote: &'a Quote,
    pub now: DateTime<Utc>,
    pub last_signal: Option<DateTime<Utc>>,
}

/// A pure predicate over the evaluation context.
///
/// # Architecture invariant
/// Conditions must not mutate anything; the engine owns all state.
pub trait Condition: Send + Sync {
    fn name(&self) -> ConditionName;

    fn check(&self, ctx: &ConditionContext<'_>) -> ConditionResult;
}

/// The ordered condition list built from one configuration.
pub struct Pipeline {
    cooldown: CooldownCondition,
    conditions: Vec<Box<dyn Condition>>,
}

impl Pipeline {
    pub fn from_config(config: &EngineConfig) -> Self {
        let conditions: Vec<Box<dyn Condition>> = vec![
            Box::new(SpreadCondition::new(config.max_spread_pips)),
            Box::new(SessionCondition::new(config.sessions.clone())),
            Box::new(NewsCondition::new(config.news_filter_enabled)),
            Box::new(TrendCondition::new(config.ema_fast, config.ema_slow)),
            Box::new(MomentumCondition::new(config.rsi_lower, config.rsi_upper)),
            Box::new(InstitutionalCondition),
            Box::new(VolatilityCondition::new(config.min_atr_multiplier)),
            Box::new(StructureCondition),
        ];
        Self {
            cooldown: CooldownCondition::new(config.cooldown()),
            conditions,
        }
    }

    pub fn cooldown(&self) -> &CooldownCondition {
        &self.cooldown
    }

    /// Names in evaluation order, Cooldown first.
    pub fn names(&self) -> Vec<ConditionName> {
        std::iter::once(self.cooldown.name())
            .chain(self.conditions.iter().map(|c| c.name()))
            .collect()
    }

    /// Evaluate every condition. Never stops early.
    pub fn run(&self, ctx: &ConditionContext<'_>) -> Vec<ConditionResult> {
        let first = self.cooldown.check(ctx);
        self.conditions
            .iter()
            .fold(vec![first], |mut results, condition| {
                results.push(condition.check(ctx));
                results
            })
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("names", &self.names()).finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    /// The accepted reference setup: every condition passes with default config.
    pub fn passing_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            ema_fast: 1.10480,
            ema_slow: 1.10420,
            rsi: 58.3,
            atr: 0.00082,
            vwap: 1.10450,
            swing_low: Some(1.10420),
            current_price: 1.10500,
            current_time: london_noon(),
        }
    }

    pub fn london_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()
    }

    pub fn tight_quote() -> Quote {
        Quote::with_spread(0.4)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn pipeline_order_is_fixed() {
        let pipeline = Pipeline::from_config(&EngineConfig::default());
        assert_eq!(
            pipeline.names(),
            vec![
                ConditionName::Cooldown,
                ConditionName::Spread,
                ConditionName::Session,
                ConditionName::News,
                ConditionName::Trend,
                ConditionName::Momentum,
                ConditionName::Institutional,
                ConditionName::Volatility,
                ConditionName::Structure,
            ]
        );
    }

    #[test]
    fn reference_setup_passes_everything() {
        let pipeline = Pipeline::from_config(&EngineConfig::default());
        let snapshot = passing_snapshot();
        let quote = tight_quote();
        let ctx = ConditionContext {
            snapshot: &snapshot,
            quote: &quote,
            now: london_noon(),
            last_signal: None,
        };
        let results = pipeline.run(&ctx);
        assert_eq!(results.len(), 9);
        assert!(results.iter().all(|r| r.passed), "{results:#?}");
    }

    #[test]
    fn collects_every_failure() {
        let pipeline = Pipeline::from_config(&EngineConfig::default());
        let snapshot = IndicatorSnapshot {
            rsi: 80.0,
            vwap: 1.20,
            swing_low: None,
            ..passing_snapshot()
        };
        let quote = Quote::with_spread(3.0);
        let ctx = ConditionContext {
            snapshot: &snapshot,
            quote: &quote,
            now: london_noon(),
            last_signal: None,
        };
        let failed: Vec<ConditionName> = pipeline
            .run(&ctx)
            .into_iter()
            .filter(|r| !r.passed)
            .map(|r| r.name)
            .collect();
        assert_eq!(
            failed,
            vec![
                ConditionName::Spread,
                ConditionName::Momentum,
                ConditionName::Institutional,
                ConditionName::Structure,
            ]
        );
    }

    #[test]
    fn display_marks_outcome() {
        let r = ConditionResult::fail(ConditionName::Institutional, "Price not above VWAP");
        assert_eq!(r.to_string(), "[FAIL] VWAP: Price not above VWAP");
    }
}
