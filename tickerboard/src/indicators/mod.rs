//! Technical indicators module
//!
//! Streaming indicators over optional samples: a `None` input is a gap and
//! keeps every window that contains it undefined.

pub mod bb;
pub mod ema;
pub mod pipeline;
pub mod returns;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use bb::*;
pub use ema::*;
pub use pipeline::*;
pub use returns::*;
pub use rolling::*;
pub use rsi::*;
pub use sma::*;
pub use volatility::*;

/// Indicator trait for all indicators
pub trait Indicator {
    /// Get the name of the indicator
    fn name(&self) -> &str;

    /// Update indicator with the next sample, `None` for a gap
    fn update(&mut self, value: Option<f64>);

    /// Get current indicator value
    fn value(&self) -> Option<f64>;

    /// Check if indicator is ready (has enough data)
    fn is_ready(&self) -> bool;
}
