//! Settings file: engine configuration plus journal options.
//!
//! ```toml
//! [engine]
//! symbol = "EURUSD"
//! rsi_upper = 65.0
//!
//! [journal]
//! path = "signals_log.csv"
//! include_rejections = true
//! ```
//!
//! Every key is optional; missing keys take the reference defaults. The
//! engine table is validated on load so a bad file never reaches evaluation.

use std::fs;
use std::path::{Path, PathBuf};

use pullback_core::{ConfigError, EngineConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid engine configuration: {0}")]
    Invalid(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSettings {
    pub path: PathBuf,
    /// Also journal NO TRADE evaluations.
    pub include_rejections: bool,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("signals_log.csv"),
            include_rejections: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub journal: JournalSettings,
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(text)?;
        settings.engine.validate()?;
        Ok(settings)
    }
}

/// Load and validate a settings file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = Settings::from_toml(&text)?;
    tracing::debug!(path = %path.display(), symbol = %settings.engine.symbol, "settings loaded");
    Ok(settings)
}

/// Short BLAKE3 fingerprint of an engine configuration.
///
/// Stamped into journal rows so every signal can be traced to the exact
/// thresholds that produced it.
pub fn config_fingerprint(config: &EngineConfig) -> String {
    let mut hasher = blake3::Hasher::new();
    match serde_json::to_vec(config) {
        Ok(bytes) => {
            hasher.update(&bytes);
        }
        // Debug output covers every field; only reachable if serde fails.
        Err(_) => {
            hasher.update(format!("{config:?}").as_bytes());
        }
    }
    hasher.finalize().to_hex()[..16].to_string()
}

/// Commented settings file with every default spelled out.
pub const SETTINGS_TEMPLATE: &str = r#"# Pullback signal engine settings.
# Every key is optional; removing a line restores its default.

[engine]
symbol = "EURUSD"
timeframe = "M5"

# Indicator periods
ema_fast = 20
ema_slow = 50
rsi_period = 14
atr_period = 14
vwap_period = 100
swing_lookback = 20
swing_strength = 2

# Filter thresholds
rsi_lower = 50.0
rsi_upper = 70.0
min_atr_multiplier = 0.0001   # price units, not a percentage
max_spread_pips = 2.0

# Risk
risk_reward_ratio = 2.0
atr_stop_multiplier = 1.0
pip_size = 0.0001

# Gating
cooldown_minutes = 30
news_filter_enabled = true
min_bars_required = 200
cooldown_short_circuit = true

# UTC trading windows, inclusive; start > end wraps midnight.
[[engine.sessions]]
name = "LONDON"
start = "07:00:00"
end = "16:00:00"

[[engine.sessions]]
name = "NEW_YORK"
start = "12:00:00"
end = "21:00:00"

[journal]
path = "signals_log.csv"
include_rejections = true
"#;
