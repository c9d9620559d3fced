//! Fixed-size trailing window over optional samples

use std::collections::VecDeque;

/// Trailing window of the last `period` samples.
///
/// Statistics are only produced when the window is full and holds no gaps.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    values: VecDeque<Option<f64>>,
}

impl RollingWindow {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            values: VecDeque::with_capacity(period),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn push(&mut self, value: Option<f64>) {
        if self.values.len() == self.period {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Full window with every sample present
    pub fn is_complete(&self) -> bool {
        self.values.len() == self.period && self.values.iter().all(Option::is_some)
    }

    fn samples(&self) -> Option<impl Iterator<Item = f64> + '_> {
        self.is_complete().then(|| self.values.iter().flatten().copied())
    }

    /// Arithmetic mean of the window
    pub fn mean(&self) -> Option<f64> {
        let sum: f64 = self.samples()?.sum();
        Some(sum / self.period as f64)
    }

    /// Sample standard deviation (divides by n - 1)
    pub fn sample_std(&self) -> Option<f64> {
        if self.period < 2 {
            return None;
        }
        let mean = self.mean()?;
        let sum_sq: f64 = self.samples()?.map(|v| (v - mean).powi(2)).sum();
        Some((sum_sq / (self.period - 1) as f64).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_needs_full_period() {
        let mut w = RollingWindow::new(3);
        w.push(Some(1.0));
        w.push(Some(2.0));
        assert_eq!(w.mean(), None);
        w.push(Some(3.0));
        assert_eq!(w.mean(), Some(2.0));
        assert_eq!(w.sample_std(), Some(1.0));
        w.push(Some(4.0));
        assert_eq!(w.mean(), Some(3.0));
    }

    #[test]
    fn test_gap_blocks_until_it_leaves() {
        let mut w = RollingWindow::new(2);
        w.push(Some(1.0));
        w.push(None);
        assert_eq!(w.mean(), None);
        w.push(Some(3.0));
        assert_eq!(w.mean(), None);
        w.push(Some(5.0));
        assert_eq!(w.mean(), Some(4.0));
    }

    #[test]
    fn test_constant_window_has_zero_std() {
        let mut w = RollingWindow::new(4);
        for _ in 0..4 {
            w.push(Some(7.5));
        }
        assert_eq!(w.sample_std(), Some(0.0));
    }
}
