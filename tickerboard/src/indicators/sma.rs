//! SMA (Simple Moving Average) indicator

use crate::indicators::{Indicator, RollingWindow};

/// SMA over the trailing `period` samples
#[derive(Debug, Clone)]
pub struct SMA {
    window: RollingWindow,
    last_value: Option<f64>,
}

impl SMA {
    /// Create new SMA indicator
    pub fn new(period: usize) -> Self {
        Self {
            window: RollingWindow::new(period),
            last_value: None,
        }
    }

    /// Get SMA period
    pub fn period(&self) -> usize {
        self.window.period()
    }
}

impl Indicator for SMA {
    fn name(&self) -> &str {
        "SMA"
    }

    fn update(&mut self, value: Option<f64>) {
        self.window.push(value);
        self.last_value = self.window.mean();
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        self.last_value.is_some()
    }
}

/// Calculate SMA from a series of values
pub fn calculate_sma(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut sma = SMA::new(period);
    values
        .iter()
        .map(|&value| {
            sma.update(value);
            sma.value()
        })
        .collect()
}
