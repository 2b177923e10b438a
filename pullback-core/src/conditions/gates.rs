//! Market-access gates: cooldown, spread, session, news.
//!
//! None of these read indicators; the cooldown gate can therefore run before
//! the snapshot exists.

use chrono::{DateTime, Duration, Utc};

use super::{Condition, ConditionContext, ConditionName, ConditionResult};
use crate::session::{clock_label, matching_sessions, SessionWindow};

/// Fails while `now - last_signal < cooldown`.
#[derive(Debug, Clone, Copy)]
pub struct CooldownCondition {
    cooldown: Duration,
}

impl CooldownCondition {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn duration(&self) -> Duration {
        self.cooldown
    }

    /// Same verdict as `check`, without needing a snapshot.
    pub fn check_at(&self, now: DateTime<Utc>, last_signal: Option<DateTime<Utc>>) -> ConditionResult {
        let total = minutes_label(self.cooldown);
        let Some(last) = last_signal else {
            return ConditionResult::pass(ConditionName::Cooldown, "No previous signal");
        };

        let elapsed = now - last;
        if elapsed < self.cooldown {
            let remaining = minutes_label(self.cooldown - elapsed);
            ConditionResult::fail(
                ConditionName::Cooldown,
                format!("Cooldown active ({remaining}m remaining of {total}m)"),
            )
        } else {
            ConditionResult::pass(
                ConditionName::Cooldown,
                format!("Cooldown elapsed ({}m since last signal)", elapsed.num_minutes()),
            )
        }
    }
}

impl Condition for CooldownCondition {
    fn name(&self) -> ConditionName {
        ConditionName::Cooldown
    }

    fn check(&self, ctx: &ConditionContext<'_>) -> ConditionResult {
        self.check_at(ctx.now, ctx.last_signal)
    }
}

/// Whole minutes, rounded up so a few seconds left never reads as "0m".
fn minutes_label(d: Duration) -> i64 {
    let secs = d.num_seconds().max(0);
    (secs + 59) / 60
}

/// Fails if the quoted spread exceeds the maximum.
#[derive(Debug, Clone, Copy)]
pub struct SpreadCondition {
    max_spread_pips: f64,
}

impl SpreadCondition {
    pub fn new(max_spread_pips: f64) -> Self {
        Self { max_spread_pips }
    }
}

impl Condition for SpreadCondition {
    fn name(&self) -> ConditionName {
        ConditionName::Spread
    }

    fn check(&self, ctx: &ConditionContext<'_>) -> ConditionResult {
        let spread = ctx.quote.spread_pips;
        // A NaN spread is never acceptable.
        if spread <= self.max_spread_pips {
            ConditionResult::pass(
                ConditionName::Spread,
                format!("Spread acceptable at {spread:.1} pips"),
            )
        } else {
            ConditionResult::fail(
                ConditionName::Spread,
                format!("Spread too wide ({spread:.1} pips > {})", self.max_spread_pips),
            )
        }
    }
}

/// Passes when `now` falls inside at least one configured window.
#[derive(Debug, Clone)]
pub struct SessionCondition {
    windows: Vec<SessionWindow>,
}

impl SessionCondition {
    pub fn new(windows: Vec<SessionWindow>) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &[SessionWindow] {
        &self.windows
    }
}

impl Condition for SessionCondition {
    fn name(&self) -> ConditionName {
        ConditionName::Session
    }

    fn check(&self, ctx: &ConditionContext<'_>) -> ConditionResult {
        let matched = matching_sessions(&self.windows, ctx.now);
        if matched.is_empty() {
            ConditionResult::fail(
                ConditionName::Session,
                format!("Outside trading hours (current: {} UTC)", clock_label(ctx.now)),
            )
        } else {
            ConditionResult::pass(
                ConditionName::Session,
                format!("Trading during {} session(s)", matched.join(", ")),
            )
        }
    }
}

/// Operator switch for news risk. Always passes; never fetches anything.
#[derive(Debug, Clone, Copy)]
pub struct NewsCondition {
    enabled: bool,
}

impl NewsCondition {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Condition for NewsCondition {
    fn name(&self) -> ConditionName {
        ConditionName::News
    }

    fn check(&self, _ctx: &ConditionContext<'_>) -> ConditionResult {
        let detail = if self.enabled {
            "News filter enabled (confirm no high-impact news before trading)"
        } else {
            "News filter disabled (operator manages news risk)"
        };
        ConditionResult::pass(ConditionName::News, detail)
    }
}
