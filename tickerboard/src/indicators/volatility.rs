//! Annualized rolling volatility of returns

use crate::indicators::{Indicator, RollingWindow};

/// Trading days per year used to annualize
pub const TRADING_DAYS: f64 = 252.0;

/// Sample standard deviation of the last `period` returns times √252.
///
/// Fed with returns, not prices.
#[derive(Debug, Clone)]
pub struct Volatility {
    window: RollingWindow,
    scale: f64,
    last_value: Option<f64>,
}

impl Volatility {
    pub fn new(period: usize) -> Self {
        Self {
            window: RollingWindow::new(period),
            scale: TRADING_DAYS.sqrt(),
            last_value: None,
        }
    }

    pub fn period(&self) -> usize {
        self.window.period()
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        "Volatility"
    }

    fn update(&mut self, value: Option<f64>) {
        self.window.push(value);
        self.last_value = self.window.sample_std().map(|std| std * self.scale);
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        self.last_value.is_some()
    }
}
