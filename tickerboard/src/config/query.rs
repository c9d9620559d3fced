//! Saved dashboard query settings

use crate::data::{parse_tickers, Interval, PriceQuery};
use crate::Result;
use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A dashboard query the user can download as JSON and load again later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Ticker entries; each may itself hold a comma/newline separated list
    pub tickers: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub interval: Interval,
    /// Series the presentation layer should chart
    #[serde(default = "default_show")]
    pub show: Vec<String>,
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_show() -> Vec<String> {
    vec!["Close".to_string()]
}

fn default_name() -> String {
    "default".to_string()
}

impl Default for QuerySettings {
    fn default() -> Self {
        let end = Utc::now().date_naive();
        Self {
            tickers: Vec::new(),
            start: end - Duration::days(365),
            end,
            interval: Interval::default(),
            show: default_show(),
            name: default_name(),
        }
    }
}

impl QuerySettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).context("Failed to parse query settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            anyhow::bail!("Start date {} is after end date {}", self.start, self.end);
        }
        Ok(())
    }

    /// Normalized, deduplicated symbols
    pub fn symbols(&self) -> Vec<String> {
        parse_tickers(&self.tickers.join(","))
    }

    pub fn query(&self) -> PriceQuery {
        PriceQuery::new(self.start, self.end, self.interval)
    }
}

/// Export request: query settings plus the columns to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(flatten)]
    pub settings: QuerySettings,
    /// Columns applied to every symbol; empty keeps all
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
    /// Per-symbol overrides of `columns`
    #[serde(default)]
    pub per_symbol: HashMap<String, Vec<String>>,
}

/// Columns preselected by the dashboard
pub fn default_columns() -> Vec<String> {
    ["Close", "Return", "CumReturn", "SMA20", "RSI14", "Volatility"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl ExportRequest {
    /// Column selection per requested symbol
    pub fn selections(&self) -> HashMap<String, Vec<String>> {
        self.settings
            .symbols()
            .into_iter()
            .map(|symbol| {
                let cols = self
                    .per_symbol
                    .get(&symbol)
                    .cloned()
                    .unwrap_or_else(|| self.columns.clone());
                (symbol, cols)
            })
            .collect()
    }
}
