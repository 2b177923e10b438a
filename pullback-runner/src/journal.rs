//! Append-only CSV signal journal.
//!
//! One row per evaluation, header written once when the file is created.
//! Columns: timestamp, symbol, signal, entry, stop_loss, take_profit,
//! risk_pips, session, reasoning, config_hash.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pullback_core::{SignalKind, SignalResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::JournalSettings;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("journal csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// One journal line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRow {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub signal: SignalKind,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_pips: f64,
    pub session: String,
    /// Passed-condition details for a buy; failed ones otherwise.
    pub reasoning: String,
    pub config_hash: String,
}

impl JournalRow {
    pub fn from_result(result: &SignalResult, config_hash: &str) -> Self {
        let reasoning = if result.is_buy() {
            result.reasoning()
        } else {
            result.failure_summary()
        };
        Self {
            timestamp: result.timestamp,
            symbol: result.symbol.clone(),
            signal: result.kind,
            entry: round5(result.entry),
            stop_loss: round5(result.stop_loss),
            take_profit: round5(result.take_profit),
            risk_pips: (result.risk_pips * 10.0).round() / 10.0,
            session: result.session.clone().unwrap_or_else(|| "N/A".to_string()),
            reasoning: if reasoning.is_empty() {
                "N/A".to_string()
            } else {
                reasoning
            },
            config_hash: config_hash.to_string(),
        }
    }
}

fn round5(price: f64) -> f64 {
    (price * 1e5).round() / 1e5
}

#[derive(Debug, Clone)]
pub struct SignalJournal {
    path: PathBuf,
    include_rejections: bool,
    config_hash: String,
}

impl SignalJournal {
    pub fn new(settings: &JournalSettings, config_hash: impl Into<String>) -> Self {
        Self {
            path: settings.path.clone(),
            include_rejections: settings.include_rejections,
            config_hash: config_hash.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `result`. Returns false when it was skipped as a rejection.
    pub fn record(&self, result: &SignalResult) -> Result<bool, JournalError> {
        if !result.is_buy() && !self.include_rejections {
            return Ok(false);
        }

        let io_err = |source| JournalError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        wtr.serialize(JournalRow::from_result(result, &self.config_hash))?;
        wtr.flush().map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), kind = %result.kind, "journaled");
        Ok(true)
    }
}

/// Read every row of a journal file.
pub fn read_journal(path: &Path) -> Result<Vec<JournalRow>, JournalError> {
    let mut rdr = csv::Reader::from_path(path)?;
    rdr.deserialize()
        .collect::<Result<Vec<JournalRow>, csv::Error>>()
        .map_err(JournalError::from)
}

/// Timestamp of the most recent BUY for `symbol`, if the journal has one.
///
/// Lets a fresh process resume the cooldown where the last one left off.
pub fn last_buy(path: &Path, symbol: &str) -> Result<Option<DateTime<Utc>>, JournalError> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(read_journal(path)?
        .into_iter()
        .filter(|row| row.signal == SignalKind::Buy && row.symbol == symbol)
        .map(|row| row.timestamp)
        .max())
}
