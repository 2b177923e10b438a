//! Domain types for the signal engine

pub mod bar;
pub mod quote;
pub mod timeframe;

pub use bar::{Bar, BarError, BarSeries};
pub use quote::Quote;
pub use timeframe::Timeframe;
