use serde::{Deserialize, Serialize};

/// Live bid/ask at the instant of evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
    pub spread_pips: f64,
}

impl Quote {
    /// Build a quote, deriving the spread in pips from the instrument's pip size.
    pub fn from_bid_ask(bid: f64, ask: f64, pip_size: f64) -> Self {
        Self {
            bid,
            ask,
            spread_pips: (ask - bid) / pip_size,
        }
    }

    /// Quote known only by its spread; bid and ask are zero.
    pub fn with_spread(spread_pips: f64) -> Self {
        Self {
            bid: 0.0,
            ask: 0.0,
            spread_pips,
        }
    }

    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }
}
