//! Price fetcher contract and best-effort collection of fetch results

use crate::data::{PriceQuery, PriceSeries};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;
use tracing::warn;

/// Why a symbol could not be loaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("no data returned for {symbol}; the symbol may be invalid")]
    NoData { symbol: String },

    #[error("rate limited while fetching {symbol}")]
    RateLimited { symbol: String },

    #[error("request for {symbol} rejected with status {status}: {message}")]
    Rejected {
        symbol: String,
        status: u16,
        message: String,
    },

    #[error("transport error for {symbol}: {message}")]
    Transport { symbol: String, message: String },

    #[error("malformed response for {symbol}: {message}")]
    Malformed { symbol: String, message: String },
}

impl FetchError {
    pub fn symbol(&self) -> &str {
        match self {
            FetchError::NoData { symbol }
            | FetchError::RateLimited { symbol }
            | FetchError::Rejected { symbol, .. }
            | FetchError::Transport { symbol, .. }
            | FetchError::Malformed { symbol, .. } => symbol,
        }
    }
}

impl Serialize for FetchError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Source of historical bars for one symbol.
pub trait PriceFetcher: Send + Sync {
    fn fetch(
        &self,
        symbol: &str,
        query: &PriceQuery,
    ) -> impl Future<Output = Result<PriceSeries, FetchError>> + Send;
}

/// Result of fetching every symbol of a query.
///
/// Failures are recorded next to the successes; one bad symbol never aborts
/// the others.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchOutcome {
    pub series: BTreeMap<String, PriceSeries>,
    pub failures: BTreeMap<String, FetchError>,
    pub warnings: Vec<String>,
}

impl FetchOutcome {
    /// Fold per-symbol results. An empty series counts as a `NoData` failure.
    pub fn collect<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (String, Result<PriceSeries, FetchError>)>,
    {
        let mut outcome = Self::default();
        for (symbol, result) in results {
            match result {
                Ok(series) if series.is_empty() => {
                    warn!("No bars for {}", symbol);
                    outcome
                        .failures
                        .insert(symbol.clone(), FetchError::NoData { symbol });
                }
                Ok(series) => {
                    outcome.series.insert(symbol, series);
                }
                Err(e) => {
                    warn!("Fetch failed for {}: {}", symbol, e);
                    outcome.failures.insert(symbol, e);
                }
            }
        }
        outcome
    }

    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warnings.extend(warning);
        self
    }

    /// True when not a single symbol produced data.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(symbol: &str, n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        PriceSeries::from_closes(
            symbol,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Duration::days(1),
            &closes,
        )
    }

    #[test]
    fn test_collect_keeps_successes_and_records_failures() {
        let outcome = FetchOutcome::collect(vec![
            ("AAPL".to_string(), Ok(series("AAPL", 3))),
            (
                "BAD".to_string(),
                Err(FetchError::Transport {
                    symbol: "BAD".to_string(),
                    message: "timeout".to_string(),
                }),
            ),
            ("EMPTY".to_string(), Ok(PriceSeries::empty("EMPTY"))),
        ]);

        assert_eq!(outcome.series.len(), 1);
        assert!(outcome.series.contains_key("AAPL"));
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(
            outcome.failures.get("EMPTY"),
            Some(FetchError::NoData { .. })
        ));
        assert_eq!(outcome.failures["BAD"].symbol(), "BAD");
    }

    #[test]
    fn test_collect_nothing() {
        let outcome = FetchOutcome::collect(Vec::new()).with_warning(None);
        assert!(outcome.is_empty());
        assert!(outcome.warnings.is_empty());
    }
}
