//! Bar loading from CSV files.
//!
//! Expected header: `timestamp,open,high,low,close,volume`. The timestamp
//! column accepts RFC 3339 (`2024-03-05T09:35:00Z`), a naive
//! `YYYY-MM-DD HH:MM[:SS]` taken as UTC, or integer unix seconds. Volume may
//! be blank (treated as zero).
//!
//! Loading validates the series (sane OHLC, strictly increasing timestamps).
//! Gaps against the configured timeframe are reported, not repaired.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use pullback_core::{Bar, BarError, BarSeries, Timeframe};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unrecognised timestamp '{value}'")]
    Timestamp { row: usize, value: String },
    #[error("invalid bar series: {0}")]
    Bars(#[from] BarError),
}

#[derive(Debug, Deserialize)]
struct BarRecord {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// A spacing between consecutive bars that differs from the timeframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicityGap {
    /// Index of the bar after the gap.
    pub index: usize,
    pub expected: Duration,
    pub actual: Duration,
}

/// Load and validate a bar series from a CSV file.
pub fn load_bars_csv(path: &Path) -> Result<BarSeries, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_bars(file)?;
    let series = BarSeries::new(bars)?;
    tracing::debug!(path = %path.display(), bars = series.len(), "bars loaded");
    Ok(series)
}

/// Parse bars from any CSV reader, without series validation.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for (i, record) in rdr.deserialize::<BarRecord>().enumerate() {
        let record = record?;
        // Header is row 1.
        let row = i + 2;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            row,
            value: record.timestamp.clone(),
        })?;
        bars.push(Bar {
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume.unwrap_or(0.0),
        });
    }
    Ok(bars)
}

/// Write bars in the format `read_bars` accepts, timestamps as RFC 3339.
///
/// Numbers use the shortest text that parses back to the same `f64`, so a
/// write followed by a read is exact for whole-second timestamps.
pub fn write_bars_csv<W: Write>(bars: &[Bar], writer: W) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for bar in bars {
        wtr.write_record([
            bar.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    wtr.flush().map_err(|e| LoadError::Csv(e.into()))?;
    Ok(())
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y.%m.%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

/// Report every spacing that differs from `timeframe`, logging each at warn.
///
/// Weekend and overnight closures show up here too; callers decide whether
/// they matter.
pub fn check_periodicity(series: &BarSeries, timeframe: Timeframe) -> Vec<PeriodicityGap> {
    let expected = timeframe.duration();
    let gaps: Vec<PeriodicityGap> = series
        .as_slice()
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let actual = pair[1].timestamp - pair[0].timestamp;
            (actual != expected).then_some(PeriodicityGap {
                index: i + 1,
                expected,
                actual,
            })
        })
        .collect();

    for gap in &gaps {
        warn!(
            index = gap.index,
            expected_secs = gap.expected.num_seconds(),
            actual_secs = gap.actual.num_seconds(),
            "bar spacing differs from timeframe"
        );
    }
    gaps
}
