//! Pullback Core: the signal decision engine.
//!
//! Decides, for one instant, whether a long pullback entry is warranted:
//! - Domain types (bars, quotes, timeframes)
//! - Pure indicator library (EMA, RSI, ATR, rolling VWAP, swing lows)
//! - Nine-condition pipeline that reports every failure
//! - Risk calculator for stop-loss and take-profit levels
//! - Cooldown tracker owned by the engine
//! - Decision engine producing one `SignalResult` per evaluation
//!
//! No I/O happens here. Loading bars, journaling and reporting live in
//! `pullback-runner`.

pub mod conditions;
pub mod config;
pub mod cooldown;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod risk;
pub mod session;
pub mod signal;
pub mod snapshot;

pub use conditions::{ConditionName, ConditionResult};
pub use config::{ConfigError, EngineConfig};
pub use cooldown::CooldownTracker;
pub use domain::{Bar, BarError, BarSeries, Quote, Timeframe};
pub use engine::{EngineError, EngineStats, SharedEngine, SignalEngine};
pub use risk::{RiskCalculator, RiskError, RiskLevels};
pub use session::SessionWindow;
pub use signal::{SignalKind, SignalResult};
pub use snapshot::IndicatorSnapshot;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a host may move to a worker thread is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<BarSeries>();
        require_sync::<BarSeries>();
        require_send::<Quote>();
        require_sync::<Quote>();
        require_send::<EngineConfig>();
        require_sync::<EngineConfig>();
        require_send::<IndicatorSnapshot>();
        require_sync::<IndicatorSnapshot>();
        require_send::<SignalResult>();
        require_sync::<SignalResult>();
        require_send::<SignalEngine>();
        require_sync::<SignalEngine>();
        require_send::<SharedEngine>();
        require_sync::<SharedEngine>();
    }

    /// Architecture contract: conditions cannot reach the cooldown tracker.
    ///
    /// `Condition::check` takes a `ConditionContext`, which carries only the
    /// last-signal timestamp by value. Mutation stays in the engine.
    #[test]
    fn condition_trait_sees_only_the_context() {
        fn _check_trait_object_builds(
            condition: &dyn conditions::Condition,
            ctx: &conditions::ConditionContext<'_>,
        ) -> ConditionResult {
            condition.check(ctx)
        }
    }
}
