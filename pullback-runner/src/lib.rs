//! Pullback Runner: everything around the decision engine.
//!
//! This crate builds on `pullback-core` to provide:
//! - Settings files (engine thresholds plus journal options) and config fingerprints
//! - Bar loading and writing in CSV, with periodicity checks
//! - Deterministic synthetic bars for demos and replays
//! - The append-only signal journal, including cooldown recovery
//! - Operator reports and JSON export
//! - Historical replay over a bar series

pub mod data_loader;
pub mod journal;
pub mod replay;
pub mod report;
pub mod settings;
pub mod synthetic;

pub use data_loader::{
    check_periodicity, load_bars_csv, read_bars, write_bars_csv, LoadError, PeriodicityGap,
};
pub use journal::{last_buy, read_journal, JournalError, JournalRow, SignalJournal};
pub use replay::{replay, ReplayOptions, ReplaySummary};
pub use report::{export_json, render_report, Report};
pub use settings::{
    config_fingerprint, load_settings, JournalSettings, Settings, SettingsError,
    SETTINGS_TEMPLATE,
};
pub use synthetic::{generate_bars, SyntheticSpec};
