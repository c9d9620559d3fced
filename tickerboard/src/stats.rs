//! Descriptive statistics of a price series

use crate::data::PriceSeries;
use crate::indicators::TRADING_DAYS;
use serde::Serialize;

/// Whole-range statistics shown next to each instrument.
///
/// Percent fields are already multiplied by 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStats {
    pub observations: usize,
    pub first: f64,
    pub last: f64,
    pub total_return_pct: f64,
    pub mean_return_pct: Option<f64>,
    pub std_return_pct: Option<f64>,
    pub annualized_volatility_pct: Option<f64>,
    pub max_drawdown_pct: f64,
}

impl SeriesStats {
    /// Statistics over the defined closes; `None` when there are none.
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let prices: Vec<f64> = series.closes().into_iter().flatten().collect();
        let first = *prices.first()?;
        let last = *prices.last()?;

        let returns: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let std = sample_std(&returns);

        let mut peak = f64::MIN;
        let mut max_drawdown = 0.0_f64;
        for &p in &prices {
            peak = peak.max(p);
            max_drawdown = max_drawdown.min(p / peak - 1.0);
        }

        Some(Self {
            observations: prices.len(),
            first,
            last,
            total_return_pct: (last / first - 1.0) * 100.0,
            mean_return_pct: mean(&returns).map(|m| m * 100.0),
            std_return_pct: std.map(|s| s * 100.0),
            annualized_volatility_pct: std.map(|s| s * TRADING_DAYS.sqrt() * 100.0),
            max_drawdown_pct: max_drawdown * 100.0,
        })
    }

    /// Copy rounded to three decimals for display
    pub fn rounded(&self) -> Self {
        Self {
            observations: self.observations,
            first: round3(self.first),
            last: round3(self.last),
            total_return_pct: round3(self.total_return_pct),
            mean_return_pct: self.mean_return_pct.map(round3),
            std_return_pct: self.std_return_pct.map(round3),
            annualized_volatility_pct: self.annualized_volatility_pct.map(round3),
            max_drawdown_pct: round3(self.max_drawdown_pct),
        }
    }
}

/// Last price and move against the previous close
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteOverview {
    pub symbol: String,
    pub last: Option<f64>,
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    /// Trading currency reported by the feed
    pub currency: Option<String>,
    /// Exchange name reported by the feed
    pub exchange: Option<String>,
}

impl QuoteOverview {
    /// Built from a short daily series, typically the last five sessions.
    pub fn from_series(series: &PriceSeries) -> Self {
        let closes: Vec<f64> = series.closes().into_iter().flatten().collect();
        let last = closes.last().copied();
        let prev = closes.len().checked_sub(2).map(|i| closes[i]).filter(|p| *p != 0.0);

        let change = last.zip(prev).map(|(l, p)| l - p);
        let change_pct = change.zip(prev).map(|(c, p)| c / p * 100.0);

        Self {
            symbol: series.symbol().to_string(),
            last,
            change,
            change_pct,
            currency: None,
            exchange: None,
        }
    }

    /// Attach the listing details that come with the quote feed.
    pub fn with_market(mut self, currency: Option<String>, exchange: Option<String>) -> Self {
        self.currency = currency.filter(|c| !c.is_empty());
        self.exchange = exchange.filter(|e| !e.is_empty());
        self
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}
