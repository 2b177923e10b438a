//! Human-readable signal report and JSON export.

use std::fmt;

use anyhow::{Context, Result};
use pullback_core::{ConditionName, EngineConfig, SignalResult};

const RULE_WIDTH: usize = 80;

/// Operator-facing report for one evaluation.
pub struct Report<'a> {
    pub result: &'a SignalResult,
    pub config: &'a EngineConfig,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "{heavy}")?;
        writeln!(f, "PULLBACK TRADING SIGNAL")?;
        writeln!(f, "{heavy}")?;
        writeln!(f, "SYMBOL:          {}", result.symbol)?;
        writeln!(f, "TIMEFRAME:       {}", result.timeframe)?;
        writeln!(
            f,
            "TIMESTAMP:       {}",
            result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            f,
            "SESSION:         {}",
            result.session.as_deref().unwrap_or("N/A")
        )?;
        writeln!(f, "{light}")?;
        writeln!(f, "SIGNAL:          {}", result.kind)?;
        writeln!(f, "ENTRY:           {:.5}", result.entry)?;
        writeln!(f, "STOP LOSS:       {:.5}", result.stop_loss)?;
        writeln!(f, "TAKE PROFIT:     {:.5}", result.take_profit)?;
        writeln!(f, "RISK (pips):     {:.1}", result.risk_pips)?;
        writeln!(f, "SPREAD (pips):   {:.1}", result.spread_pips)?;
        writeln!(f, "{light}")?;

        let trend = match result.reasons.iter().find(|r| r.name == ConditionName::Trend) {
            Some(r) if r.passed => "UPTREND CONFIRMED",
            Some(_) => "NO VALID TREND",
            None => "NOT EVALUATED",
        };
        writeln!(f, "TREND STATUS:    {trend}")?;
        writeln!(f, "{light}")?;

        match &result.snapshot {
            Some(s) => {
                writeln!(f, "INDICATOR VALUES:")?;
                writeln!(f, "  EMA {:<10}{:.5}", self.config.ema_fast, s.ema_fast)?;
                writeln!(f, "  EMA {:<10}{:.5}", self.config.ema_slow, s.ema_slow)?;
                writeln!(f, "  RSI:          {:.1}", s.rsi)?;
                writeln!(f, "  ATR:          {:.5}", s.atr)?;
                writeln!(f, "  VWAP:         {:.5}", s.vwap)?;
                match s.swing_low {
                    Some(low) => writeln!(f, "  Swing Low:    {low:.5}")?,
                    None => writeln!(f, "  Swing Low:    none")?,
                }
                writeln!(f, "  Price:        {:.5}", s.current_price)?;
            }
            None => writeln!(f, "INDICATOR VALUES: not computed")?,
        }
        writeln!(f, "{light}")?;

        if result.is_buy() {
            writeln!(f, "REASONING:")?;
            for reason in &result.reasons {
                writeln!(f, "  + {}", reason.detail)?;
            }
            writeln!(f, "  + Risk:Reward = 1:{}", self.config.risk_reward_ratio)?;
        } else {
            writeln!(f, "FAILED CONDITIONS:")?;
            for reason in result.failed() {
                writeln!(f, "  x [{}] {}", reason.name, reason.detail)?;
            }
        }

        writeln!(f, "{heavy}")?;
        writeln!(f, "DISCLAIMER: This is NOT a buy/sell recommendation.")?;
        writeln!(f, "Execute trades at your own discretion and risk.")?;
        writeln!(f, "{heavy}")
    }
}

pub fn render_report(result: &SignalResult, config: &EngineConfig) -> String {
    Report { result, config }.to_string()
}

/// Serialize a `SignalResult` to pretty JSON.
pub fn export_json(result: &SignalResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize SignalResult to JSON")
}
