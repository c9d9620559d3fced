//! EMA (Exponential Moving Average) indicator

use crate::indicators::Indicator;

/// Non-adjusted EMA with `alpha = 2 / (span + 1)`.
///
/// Seeded with the first observation. A gap repeats the previous value and
/// decays the weight of the old average, so the first observation after `k`
/// gaps is blended as `((1-a)^(k+1) * prev + a * x) / ((1-a)^(k+1) + a)`.
#[derive(Debug, Clone)]
pub struct EMA {
    span: usize,
    alpha: f64,
    current: Option<f64>,
    old_weight: f64,
}

impl EMA {
    /// Create new EMA indicator
    pub fn new(span: usize) -> Self {
        Self {
            span,
            alpha: 2.0 / (span as f64 + 1.0),
            current: None,
            old_weight: 1.0,
        }
    }

    /// Get EMA span
    pub fn period(&self) -> usize {
        self.span
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Indicator for EMA {
    fn name(&self) -> &str {
        "EMA"
    }

    fn update(&mut self, value: Option<f64>) {
        let decay = 1.0 - self.alpha;
        match (value, self.current) {
            (None, None) => {}
            (None, Some(_)) => self.old_weight *= decay,
            (Some(x), None) => {
                self.current = Some(x);
                self.old_weight = 1.0;
            }
            (Some(x), Some(prev)) => {
                let w = self.old_weight * decay;
                self.current = Some((w * prev + self.alpha * x) / (w + self.alpha));
                self.old_weight = 1.0;
            }
        }
    }

    fn value(&self) -> Option<f64> {
        self.current
    }

    fn is_ready(&self) -> bool {
        self.current.is_some()
    }
}

/// Calculate EMA from a series of values
pub fn calculate_ema(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let mut ema = EMA::new(span);
    values
        .iter()
        .map(|&value| {
            ema.update(value);
            ema.value()
        })
        .collect()
}
