//! Evaluation output.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conditions::{ConditionName, ConditionResult};
use crate::domain::Timeframe;
use crate::risk::RiskLevels;
use crate::snapshot::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    Buy,
    NoTrade,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("BUY"),
            Self::NoTrade => f.write_str("NO TRADE"),
        }
    }
}

/// One evaluation's verdict, handed to logging and presentation.
///
/// On `NoTrade`, `entry`, `stop_loss`, `take_profit` and `risk_pips` are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// The injected evaluation instant.
    pub timestamp: DateTime<Utc>,
    pub kind: SignalKind,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_pips: f64,
    pub spread_pips: f64,
    /// Matched session names joined with `+`, if any.
    pub session: Option<String>,
    pub matched_sessions: Vec<String>,
    /// Absent when the evaluation stopped before indicators were computed.
    pub snapshot: Option<IndicatorSnapshot>,
    /// Every evaluated condition, in pipeline order.
    pub reasons: Vec<ConditionResult>,
}

impl SignalResult {
    pub(crate) fn accepted(
        header: ResultHeader,
        levels: &RiskLevels,
        snapshot: IndicatorSnapshot,
        reasons: Vec<ConditionResult>,
    ) -> Self {
        Self {
            kind: SignalKind::Buy,
            entry: levels.entry,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
            risk_pips: levels.risk_pips,
            snapshot: Some(snapshot),
            reasons,
            ..header.into_rejected()
        }
    }

    pub(crate) fn rejected(
        header: ResultHeader,
        snapshot: Option<IndicatorSnapshot>,
        reasons: Vec<ConditionResult>,
    ) -> Self {
        Self {
            snapshot,
            reasons,
            ..header.into_rejected()
        }
    }

    pub fn is_buy(&self) -> bool {
        self.kind == SignalKind::Buy
    }

    pub fn failed(&self) -> impl Iterator<Item = &ConditionResult> {
        self.reasons.iter().filter(|r| !r.passed)
    }

    pub fn has_failed(&self, name: ConditionName) -> bool {
        self.failed().any(|r| r.name == name)
    }

    /// Refused for lack of bar history.
    pub fn is_insufficient_data(&self) -> bool {
        self.has_failed(ConditionName::Data)
    }

    /// Refused because an indicator value was undefined over the window.
    pub fn is_indicator_undefined(&self) -> bool {
        self.has_failed(ConditionName::Indicators)
    }

    /// Every condition detail, joined with `"; "`.
    pub fn reasoning(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.detail.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Failed condition details only, joined with `"; "`.
    pub fn failure_summary(&self) -> String {
        self.failed()
            .map(|r| r.detail.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Fields shared by every result of one evaluation.
#[derive(Debug, Clone)]
pub(crate) struct ResultHeader {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub timestamp: DateTime<Utc>,
    pub spread_pips: f64,
    pub matched_sessions: Vec<String>,
}

impl ResultHeader {
    fn into_rejected(self) -> SignalResult {
        let session = if self.matched_sessions.is_empty() {
            None
        } else {
            Some(self.matched_sessions.join("+"))
        };
        SignalResult {
            symbol: self.symbol,
            timeframe: self.timeframe,
            timestamp: self.timestamp,
            kind: SignalKind::NoTrade,
            entry: 0.0,
            stop_loss: 0.0,
            take_profit: 0.0,
            risk_pips: 0.0,
            spread_pips: self.spread_pips,
            session,
            matched_sessions: self.matched_sessions,
            snapshot: None,
            reasons: Vec::new(),
        }
    }
}
