//! Decision engine.
//!
//! One call is one cycle: IDLE -> EVALUATING -> ACCEPTED | REJECTED -> IDLE.
//! The cycle order is fixed:
//! 1. cooldown gate (may short-circuit everything below)
//! 2. data sufficiency
//! 3. indicator snapshot over the trailing `min_bars_required` bars
//! 4. fold over the nine conditions
//! 5. all passed: risk levels, record cooldown, emit Buy; else emit NoTrade
//!
//! The engine performs no I/O. `&mut self` serializes evaluations on one
//! thread; `SharedEngine` does the same across threads.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::conditions::{ConditionContext, ConditionName, ConditionResult, Pipeline};
use crate::config::{ConfigError, EngineConfig};
use crate::cooldown::CooldownTracker;
use crate::domain::{Bar, BarSeries, Quote};
use crate::risk::{RiskCalculator, RiskError};
use crate::session::matching_sessions;
use crate::signal::{ResultHeader, SignalResult};
use crate::snapshot::IndicatorSnapshot;

/// Hard failures. Ordinary rejections are `Ok(SignalResult)` with `NoTrade`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A data or config defect surfaced after every condition passed.
    #[error("state inconsistency: {reason}")]
    StateInconsistency { reason: String },
    #[error("bar index {index} out of range for a series of {len} bars")]
    BarIndexOutOfRange { index: usize, len: usize },
    #[error("signal engine lock poisoned")]
    LockPoisoned,
}

impl From<RiskError> for EngineError {
    fn from(err: RiskError) -> Self {
        EngineError::StateInconsistency {
            reason: err.to_string(),
        }
    }
}

/// Running totals since construction.
///
/// `evaluations == accepted + rejected + errors` at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub evaluations: u64,
    pub accepted: u64,
    pub rejected: u64,
    /// Evaluations that ended in an `EngineError`.
    pub errors: u64,
}

#[derive(Debug)]
pub struct SignalEngine {
    config: EngineConfig,
    pipeline: Pipeline,
    risk: RiskCalculator,
    cooldown: CooldownTracker,
    stats: EngineStats,
}

impl SignalEngine {
    /// Validate `config` once and build the pipeline from it.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            pipeline: Pipeline::from_config(&config),
            risk: RiskCalculator::from_config(&config),
            cooldown: CooldownTracker::new(),
            stats: EngineStats::default(),
            config,
        })
    }

    /// Replace the cooldown state, e.g. with the last signal read back from a journal.
    pub fn with_cooldown(mut self, cooldown: CooldownTracker) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn reset_cooldown(&mut self) {
        self.cooldown.reset();
    }

    pub fn evaluate(
        &mut self,
        series: &BarSeries,
        quote: &Quote,
        now: DateTime<Utc>,
    ) -> Result<SignalResult, EngineError> {
        self.evaluate_bars(series.as_slice(), quote, now)
    }

    /// Evaluate `series` as it stood at bar `end` (inclusive).
    ///
    /// Bars after `end` are never read, so replaying history cannot peek ahead.
    pub fn evaluate_at(
        &mut self,
        series: &BarSeries,
        end: usize,
        quote: &Quote,
        now: DateTime<Utc>,
    ) -> Result<SignalResult, EngineError> {
        let bars = series.as_slice();
        let Some(upto) = bars.get(..=end) else {
            return Err(EngineError::BarIndexOutOfRange {
                index: end,
                len: bars.len(),
            });
        };
        self.evaluate_bars(upto, quote, now)
    }

    /// Evaluate the trailing `min_bars_required` bars of a validated prefix.
    fn evaluate_bars(
        &mut self,
        bars: &[Bar],
        quote: &Quote,
        now: DateTime<Utc>,
    ) -> Result<SignalResult, EngineError> {
        debug!(symbol = %self.config.symbol, bars = bars.len(), %now, "evaluating");
        let header = self.header(quote, now);
        let gate = self.pipeline.cooldown().check_at(now, self.cooldown.last_signal());

        if !gate.passed && self.config.cooldown_short_circuit {
            debug!(detail = %gate.detail, "cooldown active, skipping indicators");
            return Ok(self.reject(header, None, vec![gate]));
        }

        let need = self.config.min_bars_required;
        if bars.len() < need {
            let data = ConditionResult::fail(
                ConditionName::Data,
                format!("Insufficient data (got {} bars, need {need})", bars.len()),
            );
            return Ok(self.reject(header, None, vec![gate, data]));
        }

        let window = &bars[bars.len() - need..];
        let snapshot = match IndicatorSnapshot::compute(window, &self.config) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                let undefined = ConditionResult::fail(
                    ConditionName::Indicators,
                    format!("Indicators undefined ({err})"),
                );
                return Ok(self.reject(header, None, vec![gate, undefined]));
            }
        };

        self.decide(header, snapshot, quote, now)
    }

    /// Run the full pipeline against precomputed indicator values.
    ///
    /// Never short-circuits: every condition is reported.
    pub fn evaluate_snapshot(
        &mut self,
        snapshot: IndicatorSnapshot,
        quote: &Quote,
        now: DateTime<Utc>,
    ) -> Result<SignalResult, EngineError> {
        let header = self.header(quote, now);
        self.decide(header, snapshot, quote, now)
    }

    fn header(&self, quote: &Quote, now: DateTime<Utc>) -> ResultHeader {
        ResultHeader {
            symbol: self.config.symbol.clone(),
            timeframe: self.config.timeframe,
            timestamp: now,
            spread_pips: quote.spread_pips,
            matched_sessions: matching_sessions(&self.config.sessions, now),
        }
    }

    fn decide(
        &mut self,
        header: ResultHeader,
        snapshot: IndicatorSnapshot,
        quote: &Quote,
        now: DateTime<Utc>,
    ) -> Result<SignalResult, EngineError> {
        let ctx = ConditionContext {
            snapshot: &snapshot,
            quote,
            now,
            last_signal: self.cooldown.last_signal(),
        };
        let reasons = self.pipeline.run(&ctx);

        if reasons.iter().any(|r| !r.passed) {
            return Ok(self.reject(header, Some(snapshot), reasons));
        }

        let Some(swing_low) = snapshot.swing_low else {
            error!("structure passed without a swing low");
            return Err(self.fail(EngineError::StateInconsistency {
                reason: "structure condition passed without a swing low".to_string(),
            }));
        };
        let levels = match self
            .risk
            .levels(snapshot.current_price, snapshot.atr, swing_low)
        {
            Ok(levels) => levels,
            Err(err) => {
                error!(%err, "risk levels rejected an accepted setup");
                return Err(self.fail(err.into()));
            }
        };

        self.cooldown.record(now);
        self.stats.evaluations += 1;
        self.stats.accepted += 1;
        info!(
            symbol = %header.symbol,
            entry = levels.entry,
            stop_loss = levels.stop_loss,
            take_profit = levels.take_profit,
            risk_pips = levels.risk_pips,
            "BUY signal accepted"
        );
        Ok(SignalResult::accepted(header, &levels, snapshot, reasons))
    }

    fn fail(&mut self, err: EngineError) -> EngineError {
        self.stats.evaluations += 1;
        self.stats.errors += 1;
        err
    }

    fn reject(
        &mut self,
        header: ResultHeader,
        snapshot: Option<IndicatorSnapshot>,
        reasons: Vec<ConditionResult>,
    ) -> SignalResult {
        self.stats.evaluations += 1;
        self.stats.rejected += 1;
        for failed in reasons.iter().filter(|r| !r.passed) {
            debug!(condition = %failed.name, detail = %failed.detail, "condition failed");
        }
        let result = SignalResult::rejected(header, snapshot, reasons);
        info!(
            symbol = %result.symbol,
            failed = result.failed().count(),
            "no trade"
        );
        result
    }
}

/// A `SignalEngine` behind a mutex.
///
/// Holding the lock for the whole cycle means a cooldown recorded by one
/// evaluation is always visible to the next.
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<SignalEngine>>,
}

impl SharedEngine {
    pub fn new(engine: SignalEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn evaluate(
        &self,
        series: &BarSeries,
        quote: &Quote,
        now: DateTime<Utc>,
    ) -> Result<SignalResult, EngineError> {
        self.with(|engine| engine.evaluate(series, quote, now))?
    }

    pub fn evaluate_snapshot(
        &self,
        snapshot: IndicatorSnapshot,
        quote: &Quote,
        now: DateTime<Utc>,
    ) -> Result<SignalResult, EngineError> {
        self.with(|engine| engine.evaluate_snapshot(snapshot, quote, now))?
    }

    pub fn last_signal(&self) -> Result<Option<DateTime<Utc>>, EngineError> {
        self.with(|engine| engine.cooldown().last_signal())
    }

    pub fn stats(&self) -> Result<EngineStats, EngineError> {
        self.with(|engine| engine.stats())
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut SignalEngine) -> R) -> Result<R, EngineError> {
        let mut guard = self.inner.lock().map_err(|_| EngineError::LockPoisoned)?;
        Ok(f(&mut guard))
    }
}
