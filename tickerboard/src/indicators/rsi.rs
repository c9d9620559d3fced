//! RSI (Relative Strength Index) indicator
//!
//! Classic cut: average gain and average loss are simple means of the last
//! `period` close-to-close moves, not Wilder's smoothing.

use crate::indicators::{Indicator, RollingWindow};

/// RSI indicator
#[derive(Debug, Clone)]
pub struct RSI {
    period: usize,
    prev_close: Option<f64>,
    gains: RollingWindow,
    losses: RollingWindow,
    last_value: Option<f64>,
}

impl RSI {
    /// Create new RSI indicator
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            gains: RollingWindow::new(period),
            losses: RollingWindow::new(period),
            last_value: None,
        }
    }

    /// Get RSI period
    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for RSI {
    fn name(&self) -> &str {
        "RSI"
    }

    fn update(&mut self, value: Option<f64>) {
        let delta = match (self.prev_close, value) {
            (Some(prev), Some(close)) => Some(close - prev),
            _ => None,
        };
        self.prev_close = value;

        self.gains.push(delta.map(|d| if d > 0.0 { d } else { 0.0 }));
        self.losses.push(delta.map(|d| if d < 0.0 { -d } else { 0.0 }));

        self.last_value = match (self.gains.mean(), self.losses.mean()) {
            (Some(avg_gain), Some(avg_loss)) => rsi_from_averages(avg_gain, avg_loss),
            _ => None,
        };
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        // first move needs two closes, so period + 1 observations
        self.last_value.is_some()
    }
}

/// `100 - 100 / (1 + gain/loss)`.
///
/// Only gains saturates at 100; no movement at all is undefined.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Calculate RSI from a series of values
pub fn calculate_rsi(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut rsi = RSI::new(period);
    values
        .iter()
        .map(|&value| {
            rsi.update(value);
            rsi.value()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|&v| Some(v)).collect()
    }

    #[test]
    fn test_rsi() {
        let mut rsi = RSI::new(14);
        for value in [100.0, 102.0, 101.0, 103.0, 105.0, 104.0, 106.0] {
            rsi.update(Some(value));
        }

        // 14 moves need 15 closes
        assert!(!rsi.is_ready());
    }

    #[test]
    fn test_rsi_first_value_at_period() {
        let values: Vec<f64> = (0..16).map(|i| 100.0 + (i % 3) as f64).collect();
        let rsi = calculate_rsi(&closes(&values), 14);
        assert!(rsi[..14].iter().all(Option::is_none));
        assert!(rsi[14].is_some());
        assert!(rsi[15].is_some());
    }

    #[test]
    fn test_rsi_saturation_and_degenerate() {
        assert_eq!(rsi_from_averages(1.5, 0.0), Some(100.0));
        assert_eq!(rsi_from_averages(0.0, 0.0), None);
        assert_eq!(rsi_from_averages(0.0, 2.0), Some(0.0));
        assert_eq!(rsi_from_averages(1.0, 1.0), Some(50.0));
    }

    #[test]
    fn test_flat_market_is_undefined() {
        let rsi = calculate_rsi(&closes(&[100.0; 20]), 14);
        assert!(rsi.iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_range_check() {
        let values = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in calculate_rsi(&closes(&values), 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }
}
