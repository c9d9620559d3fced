//! OHLCV bar and series data structures

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Keep a value only if it is a finite float.
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// One OHLCV bar.
///
/// Upstream sources publish nulls inside their price arrays, so every field
/// is optional. A missing close is a gap that propagates into indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Bar timestamp
    #[serde(rename = "Date")]
    pub date: DateTime<Utc>,
    /// Opening price
    #[serde(rename = "Open")]
    pub open: Option<f64>,
    /// High price
    #[serde(rename = "High")]
    pub high: Option<f64>,
    /// Low price
    #[serde(rename = "Low")]
    pub low: Option<f64>,
    /// Closing price
    #[serde(rename = "Close")]
    pub close: Option<f64>,
    /// Close adjusted for splits and dividends, when the feed provides it
    #[serde(rename = "Adj Close", default)]
    pub adj_close: Option<f64>,
    /// Volume
    #[serde(rename = "Volume")]
    pub volume: Option<f64>,
}

impl PriceBar {
    /// Create a fully populated bar. Non-finite values are stored as gaps.
    pub fn new(date: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open: finite(open),
            high: finite(high),
            low: finite(low),
            close: finite(close),
            adj_close: None,
            volume: finite(volume),
        }
    }

    /// Create a bar from optional fields, as decoded from a feed.
    pub fn from_parts(
        date: DateTime<Utc>,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
        volume: Option<f64>,
    ) -> Self {
        Self {
            date,
            open: open.and_then(finite),
            high: high.and_then(finite),
            low: low.and_then(finite),
            close: close.and_then(finite),
            adj_close: None,
            volume: volume.and_then(finite),
        }
    }

    /// Bar whose only known price is the close.
    pub fn close_only(date: DateTime<Utc>, close: Option<f64>) -> Self {
        let close = close.and_then(finite);
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            adj_close: None,
            volume: None,
        }
    }

    pub fn with_adj_close(mut self, adj_close: Option<f64>) -> Self {
        self.adj_close = adj_close.and_then(finite);
        self
    }
}

/// Price history of one instrument for one query.
///
/// Bars are ascending by date with no duplicate dates. The series is
/// immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, sorting bars by date. For a repeated date the bar
    /// that came last in the input wins.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);

        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    /// Series with no bars.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    /// Series of close-only bars spaced `step` apart starting at `start`.
    pub fn from_closes(
        symbol: impl Into<String>,
        start: DateTime<Utc>,
        step: Duration,
        closes: &[f64],
    ) -> Self {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar::close_only(start + step * i as i32, Some(close)))
            .collect();
        Self::new(symbol, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get number of bars
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get bar at index
    pub fn get(&self, index: usize) -> Option<&PriceBar> {
        self.bars.get(index)
    }

    /// Get last bar
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Get all bars
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Close prices, gaps included
    pub fn closes(&self) -> Vec<Option<f64>> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Dates of all bars
    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.date).collect()
    }
}
