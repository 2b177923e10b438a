//! Historical replay: walk a bar series and evaluate at every bar close.
//!
//! Each step hands the engine the bars up to and including one bar, with
//! `now` set to that bar's close (its timestamp plus one timeframe period).
//! The engine keeps its cooldown across steps, so a replay reproduces what a
//! live loop polling once per bar would have emitted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pullback_core::{BarSeries, ConditionName, Quote, SignalEngine, SignalResult};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayOptions {
    /// Spread assumed at every step; bars carry no quotes.
    pub spread_pips: f64,
    /// Evaluate every `step`th bar. Zero is treated as one.
    pub step: usize,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            spread_pips: 1.0,
            step: 1,
        }
    }
}

/// Outcome of one replay.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplaySummary {
    pub evaluations: usize,
    pub accepted: Vec<SignalResult>,
    pub rejected: usize,
    /// How often each condition failed across rejected evaluations.
    pub failure_counts: BTreeMap<ConditionName, usize>,
    /// Evaluations that ended in an engine error, with their `now`.
    pub errors: Vec<(DateTime<Utc>, String)>,
}

impl ReplaySummary {
    pub fn acceptance_rate(&self) -> f64 {
        if self.evaluations == 0 {
            0.0
        } else {
            self.accepted.len() as f64 / self.evaluations as f64
        }
    }

    /// Condition that failed most often, ties broken by pipeline order.
    pub fn most_common_failure(&self) -> Option<(ConditionName, usize)> {
        self.failure_counts
            .iter()
            .map(|(name, count)| (*name, *count))
            .fold(None, |best, (name, count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((name, count)),
            })
    }

    fn absorb(&mut self, result: &SignalResult) {
        self.evaluations += 1;
        if result.is_buy() {
            self.accepted.push(result.clone());
        } else {
            self.rejected += 1;
            for failed in result.failed() {
                *self.failure_counts.entry(failed.name).or_insert(0) += 1;
            }
        }
    }
}

/// Replay `series` through `engine`, calling `on_result` after each step.
///
/// Steps begin once `min_bars_required` bars are available. An engine error
/// is logged and recorded, and the replay carries on; an error from
/// `on_result` stops it.
pub fn replay<E>(
    engine: &mut SignalEngine,
    series: &BarSeries,
    options: &ReplayOptions,
    mut on_result: impl FnMut(&SignalResult) -> Result<(), E>,
) -> Result<ReplaySummary, E> {
    let bars = series.as_slice();
    let need = engine.config().min_bars_required;
    let period = engine.config().timeframe.duration();
    let step = options.step.max(1);
    let quote = Quote::with_spread(options.spread_pips);

    let mut summary = ReplaySummary::default();
    if bars.len() < need {
        debug!(bars = bars.len(), need, "series shorter than warmup, nothing to replay");
        return Ok(summary);
    }

    for end in (need.saturating_sub(1)..bars.len()).step_by(step) {
        let now = bars[end].timestamp + period;
        match engine.evaluate_at(series, end, &quote, now) {
            Ok(result) => {
                summary.absorb(&result);
                on_result(&result)?;
            }
            Err(err) => {
                warn!(%now, %err, "evaluation failed during replay");
                summary.evaluations += 1;
                summary.errors.push((now, err.to_string()));
            }
        }
    }

    info!(
        symbol = %engine.config().symbol,
        evaluations = summary.evaluations,
        accepted = summary.accepted.len(),
        rejected = summary.rejected,
        errors = summary.errors.len(),
        "replay complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{generate_bars, SyntheticSpec};
    use chrono::Duration;
    use pullback_core::EngineConfig;
    use std::convert::Infallible;

    fn synthetic(bars: usize) -> BarSeries {
        BarSeries::new(generate_bars(&SyntheticSpec {
            bars,
            ..SyntheticSpec::default()
        }))
        .unwrap()
    }

    fn engine() -> SignalEngine {
        SignalEngine::new(EngineConfig::default()).unwrap()
    }

    fn run(series: &BarSeries, options: &ReplayOptions) -> ReplaySummary {
        replay(&mut engine(), series, options, |_| Ok::<(), Infallible>(())).unwrap()
    }

    #[test]
    fn one_evaluation_per_bar_after_warmup() {
        let series = synthetic(260);
        let summary = run(&series, &ReplayOptions::default());
        assert_eq!(summary.evaluations, 61);
        assert_eq!(
            summary.accepted.len() + summary.rejected + summary.errors.len(),
            summary.evaluations
        );
    }

    #[test]
    fn step_skips_bars() {
        let series = synthetic(260);
        let summary = run(
            &series,
            &ReplayOptions {
                step: 10,
                ..ReplayOptions::default()
            },
        );
        // Ends 200, 210, ..., 260.
        assert_eq!(summary.evaluations, 7);
    }

    #[test]
    fn zero_step_behaves_like_one() {
        let series = synthetic(210);
        let summary = run(
            &series,
            &ReplayOptions {
                step: 0,
                ..ReplayOptions::default()
            },
        );
        assert_eq!(summary.evaluations, 11);
    }

    #[test]
    fn short_series_replays_nothing() {
        let series = synthetic(150);
        let summary = run(&series, &ReplayOptions::default());
        assert_eq!(summary.evaluations, 0);
        assert!(summary.most_common_failure().is_none());
        assert_eq!(summary.acceptance_rate(), 0.0);
    }

    #[test]
    fn accepted_signals_respect_cooldown() {
        let series = synthetic(500);
        let summary = run(&series, &ReplayOptions::default());
        for pair in summary.accepted.windows(2) {
            assert!(pair[1].timestamp - pair[0].timestamp >= Duration::minutes(30));
        }
    }

    #[test]
    fn every_rejection_is_counted_against_a_condition() {
        let series = synthetic(400);
        let summary = run(&series, &ReplayOptions::default());
        let failures: usize = summary.failure_counts.values().sum();
        assert!(failures >= summary.rejected);
    }

    #[test]
    fn wide_spread_blocks_everything() {
        let series = synthetic(300);
        let summary = run(
            &series,
            &ReplayOptions {
                spread_pips: 5.0,
                step: 1,
            },
        );
        assert!(summary.accepted.is_empty());
        assert_eq!(summary.failure_counts.get(&ConditionName::Spread), Some(&101));
    }

    #[test]
    fn callback_sees_each_result_and_can_stop_the_replay() {
        let series = synthetic(230);
        let mut seen = 0;
        let err = replay(&mut engine(), &series, &ReplayOptions::default(), |_| {
            seen += 1;
            if seen == 5 {
                Err("stop")
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        assert_eq!(err, "stop");
        assert_eq!(seen, 5);
    }

    #[test]
    fn most_common_failure_prefers_pipeline_order_on_ties() {
        let mut summary = ReplaySummary::default();
        summary.failure_counts.insert(ConditionName::Momentum, 4);
        summary.failure_counts.insert(ConditionName::Session, 4);
        summary.failure_counts.insert(ConditionName::Trend, 2);
        assert_eq!(
            summary.most_common_failure(),
            Some((ConditionName::Session, 4))
        );
    }
}
