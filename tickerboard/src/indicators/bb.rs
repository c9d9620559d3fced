//! Bollinger Bands indicator

use crate::indicators::{Indicator, RollingWindow};
use serde::Serialize;

/// Bollinger Bands: SMA of the window ± `multiplier` sample standard deviations
#[derive(Debug, Clone)]
pub struct BollingerBands {
    window: RollingWindow,
    multiplier: f64,
    last_output: Option<BBResult>,
}

impl BollingerBands {
    /// Create new Bollinger Bands indicator
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self {
            window: RollingWindow::new(period),
            multiplier,
            last_output: None,
        }
    }

    /// Get upper band
    pub fn upper(&self) -> Option<f64> {
        self.last_output.as_ref().map(|o| o.upper)
    }

    /// Get middle band (SMA)
    pub fn middle(&self) -> Option<f64> {
        self.last_output.as_ref().map(|o| o.middle)
    }

    /// Get lower band
    pub fn lower(&self) -> Option<f64> {
        self.last_output.as_ref().map(|o| o.lower)
    }

    pub fn output(&self) -> Option<&BBResult> {
        self.last_output.as_ref()
    }
}

impl Indicator for BollingerBands {
    fn name(&self) -> &str {
        "BollingerBands"
    }

    fn update(&mut self, value: Option<f64>) {
        self.window.push(value);
        self.last_output = match (self.window.mean(), self.window.sample_std()) {
            (Some(middle), Some(std)) => Some(BBResult {
                upper: middle + self.multiplier * std,
                middle,
                lower: middle - self.multiplier * std,
            }),
            _ => None,
        };
    }

    fn value(&self) -> Option<f64> {
        self.middle()
    }

    fn is_ready(&self) -> bool {
        self.last_output.is_some()
    }
}

/// Bollinger Bands result structure
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}
