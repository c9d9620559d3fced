//! Yahoo Finance chart and search client
//!
//! Prices come from the v8 chart endpoint, whose quote arrays carry `null`
//! for bars the exchange did not print. Those nulls are kept as gaps.

use anyhow::Context;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use futures::future::join_all;
use serde::Deserialize;
use std::time::Duration;
use tickerboard::data::{
    FetchError, FetchOutcome, Interval, PriceBar, PriceFetcher, PriceQuery, PriceSeries,
    SymbolMatch,
};
use tickerboard::stats::QuoteOverview;
use tracing::{debug, info, warn};

use crate::config::Config;

const SEARCH_RETRY_DELAY: Duration = Duration::from_millis(1500);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; tickerboard/0.1)";

#[derive(Debug, Clone)]
pub struct YahooClient {
    chart_url: String,
    search_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
    currency: Option<String>,
    #[serde(rename = "exchangeName")]
    exchange_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    #[serde(default)]
    symbol: String,
    shortname: Option<String>,
    longname: Option<String>,
    name: Option<String>,
    #[serde(rename = "exchDisp")]
    exch_disp: Option<String>,
}

impl SearchQuote {
    fn into_match(self) -> SymbolMatch {
        let name = [self.shortname, self.longname, self.name]
            .into_iter()
            .flatten()
            .find(|n| !n.is_empty())
            .unwrap_or_default();
        SymbolMatch {
            symbol: self.symbol,
            name,
            exchange: self.exch_disp.unwrap_or_default(),
        }
    }
}

/// Decoded chart response: the bars plus listing details from its meta block.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChartData {
    pub series: PriceSeries,
    pub currency: Option<String>,
    pub exchange: Option<String>,
}

impl YahooClient {
    pub fn new(chart_url: String, search_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            chart_url,
            search_url,
            client,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.yahoo_chart_url.clone(),
            config.yahoo_search_url.clone(),
            config.http_timeout(),
        )
    }

    /// Fetch every symbol concurrently. Individual failures end up in the
    /// outcome; they never abort the other symbols.
    pub async fn fetch_all(&self, symbols: &[String], query: &PriceQuery) -> FetchOutcome {
        let warning = query.range_warning();
        if let Some(w) = &warning {
            warn!("{}", w);
        }

        let results = join_all(symbols.iter().map(|symbol| async move {
            (symbol.clone(), self.fetch(symbol, query).await)
        }))
        .await;

        let outcome = FetchOutcome::collect(results).with_warning(warning);
        info!(
            "Fetched {} symbols ({} ok, {} failed)",
            symbols.len(),
            outcome.series.len(),
            outcome.failures.len()
        );
        outcome
    }

    /// Best-effort symbol search. Errors are logged and give an empty list.
    pub async fn search(&self, query: &str) -> Vec<SymbolMatch> {
        match self.try_search(query).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Symbol search for '{}' failed: {:#}", query, e);
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str) -> anyhow::Result<Vec<SymbolMatch>> {
        let params = [("q", query), ("lang", "en-US"), ("region", "US")];
        let mut response = self.client.get(&self.search_url).query(&params).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            debug!("Search rate limited, retrying once");
            tokio::time::sleep(SEARCH_RETRY_DELAY).await;
            response = self.client.get(&self.search_url).query(&params).send().await?;
        }

        let body: SearchResponse = response.error_for_status()?.json().await?;
        Ok(body.quotes.into_iter().map(SearchQuote::into_match).collect())
    }

    /// Last close and change against the previous session, from a 5-day
    /// daily series, with the currency and exchange the chart reports.
    pub async fn quote(&self, symbol: &str) -> Result<QuoteOverview, FetchError> {
        let params = vec![
            ("range", "5d".to_string()),
            ("interval", Interval::OneDay.as_str().to_string()),
        ];
        let chart = self.chart(symbol, &params, Interval::OneDay).await?;
        overview(symbol, chart)
    }

    async fn chart(
        &self,
        symbol: &str,
        params: &[(&str, String)],
        interval: Interval,
    ) -> Result<ChartData, FetchError> {
        let url = format!(
            "{}/{}",
            self.chart_url.trim_end_matches('/'),
            symbol.replace('^', "%5E")
        );
        let transport = |e: reqwest::Error| FetchError::Transport {
            symbol: symbol.to_string(),
            message: e.to_string(),
        };

        debug!("GET {} {:?}", url, params);
        let response = self.client.get(&url).query(params).send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;

        decode_chart(symbol, status, &body, interval)
    }
}

impl PriceFetcher for YahooClient {
    async fn fetch(&self, symbol: &str, query: &PriceQuery) -> Result<PriceSeries, FetchError> {
        let params = vec![
            ("period1", day_timestamp(query.start).to_string()),
            ("period2", day_timestamp(query.end_exclusive()).to_string()),
            ("interval", query.interval.as_str().to_string()),
            ("includePrePost", "false".to_string()),
        ];
        Ok(self.chart(symbol, &params, query.interval).await?.series)
    }
}

fn day_timestamp(day: NaiveDate) -> i64 {
    day.and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc().timestamp())
        .unwrap_or_default()
}

fn overview(symbol: &str, chart: ChartData) -> Result<QuoteOverview, FetchError> {
    if chart.series.is_empty() {
        return Err(FetchError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(QuoteOverview::from_series(&chart.series).with_market(chart.currency, chart.exchange))
}

/// Decode a chart response body into a series and its meta details.
pub(crate) fn decode_chart(
    symbol: &str,
    status: u16,
    body: &str,
    interval: Interval,
) -> Result<ChartData, FetchError> {
    if status == 429 {
        return Err(FetchError::RateLimited {
            symbol: symbol.to_string(),
        });
    }

    let envelope: ChartEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if status >= 400 => {
            return Err(FetchError::Rejected {
                symbol: symbol.to_string(),
                status,
                message: body.chars().take(200).collect(),
            })
        }
        Err(e) => {
            return Err(FetchError::Malformed {
                symbol: symbol.to_string(),
                message: e.to_string(),
            })
        }
    };

    if let Some(err) = envelope.chart.error {
        if status == 404 || err.code == "Not Found" {
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
            });
        }
        return Err(FetchError::Rejected {
            symbol: symbol.to_string(),
            status,
            message: err.description.unwrap_or(err.code),
        });
    }
    if status >= 400 {
        return Err(FetchError::Rejected {
            symbol: symbol.to_string(),
            status,
            message: "empty error body".to_string(),
        });
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(FetchError::NoData {
            symbol: symbol.to_string(),
        });
    };

    let meta = result.meta.unwrap_or_default();
    let offset = meta.gmtoffset.unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjusted = result.indicators.adjclose.into_iter().next().unwrap_or_default();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = bar_date(ts, offset, interval)?;
            Some(PriceBar::from_parts(
                date,
                at(&quote.open, i),
                at(&quote.high, i),
                at(&quote.low, i),
                at(&quote.close, i),
                at(&quote.volume, i),
            )
            .with_adj_close(at(&adjusted.adjclose, i)))
        })
        .collect();

    Ok(ChartData {
        series: PriceSeries::new(symbol, bars),
        currency: meta.currency,
        exchange: meta.exchange_name,
    })
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// Intraday bars keep their instant; daily and longer bars are pinned to the
/// exchange-local calendar day.
fn bar_date(ts: i64, gmtoffset: i64, interval: Interval) -> Option<DateTime<Utc>> {
    let instant = Utc.timestamp_opt(ts, 0).single()?;
    if interval.is_intraday() {
        return Some(instant);
    }
    let local_day = (instant + ChronoDuration::seconds(gmtoffset)).date_naive();
    Some(local_day.and_hms_opt(0, 0, 0)?.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_chart(
        symbol: &str,
        status: u16,
        body: &str,
        interval: Interval,
    ) -> Result<PriceSeries, FetchError> {
        decode_chart(symbol, status, body, interval).map(|chart| chart.series)
    }

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "THYAO.IS", "currency": "TRY", "exchangeName": "IST", "gmtoffset": 10800},
                "timestamp": [1704175200, 1704261600, 1704348000],
                "indicators": {"quote": [{
                    "open":   [280.0, null, 283.5],
                    "high":   [285.0, null, 290.0],
                    "low":    [279.0, null, 282.0],
                    "close":  [284.0, null, 289.25],
                    "volume": [1200000, null, 980000]
                }], "adjclose": [{"adjclose": [270.5, null, 289.25]}]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_keeps_null_bars_as_gaps() {
        let series = parse_chart("THYAO.IS", 200, CHART, Interval::OneDay).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![Some(284.0), None, Some(289.25)]);
        assert_eq!(series.get(0).unwrap().volume, Some(1_200_000.0));

        let first = series.get(0).unwrap().date;
        assert_eq!(first.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(first.timestamp() % 86_400, 0);
    }

    #[test]
    fn test_parse_chart_reads_adjusted_close() {
        let series = parse_chart("THYAO.IS", 200, CHART, Interval::OneDay).unwrap();
        let adjusted: Vec<Option<f64>> = series.bars().iter().map(|b| b.adj_close).collect();
        assert_eq!(adjusted, vec![Some(270.5), None, Some(289.25)]);

        let body = r#"{"chart":{"result":[{"timestamp":[1704175200],"indicators":{"quote":[{"close":[1.0]}]}}],"error":null}}"#;
        let plain = parse_chart("X", 200, body, Interval::OneDay).unwrap();
        assert_eq!(plain.get(0).unwrap().adj_close, None);
    }

    #[test]
    fn test_quote_overview_carries_currency_and_exchange() {
        let chart = decode_chart("THYAO.IS", 200, CHART, Interval::OneDay).unwrap();
        let quote = overview("THYAO.IS", chart).unwrap();
        assert_eq!(quote.last, Some(289.25));
        assert_eq!(quote.currency.as_deref(), Some("TRY"));
        assert_eq!(quote.exchange.as_deref(), Some("IST"));

        let empty = r#"{"chart":{"result":[{"meta":{"currency":"USD"},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let chart = decode_chart("EMPTY", 200, empty, Interval::OneDay).unwrap();
        assert!(matches!(overview("EMPTY", chart), Err(FetchError::NoData { .. })));
    }

    #[test]
    fn test_parse_chart_intraday_keeps_instant() {
        let series = parse_chart("THYAO.IS", 200, CHART, Interval::FiveMinutes).unwrap();
        assert_eq!(series.get(0).unwrap().date.timestamp(), 1704175200);
    }

    #[test]
    fn test_parse_chart_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("NOPE", 404, body, Interval::OneDay).unwrap_err();
        assert_eq!(
            err,
            FetchError::NoData {
                symbol: "NOPE".to_string()
            }
        );
    }

    #[test]
    fn test_parse_chart_rate_limit_and_rejection() {
        assert!(matches!(
            parse_chart("A", 429, "Too Many Requests", Interval::OneDay),
            Err(FetchError::RateLimited { .. })
        ));

        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input - interval=1m is not supported for the requested range"}}}"#;
        match parse_chart("A", 422, body, Interval::OneMinute) {
            Err(FetchError::Rejected { status, message, .. }) => {
                assert_eq!(status, 422);
                assert!(message.starts_with("Invalid input"));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            parse_chart("A", 200, "<html>", Interval::OneDay),
            Err(FetchError::Malformed { .. })
        ));
    }

    #[test]
    fn test_parse_chart_without_timestamps_is_empty() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let series = parse_chart("EMPTY", 200, body, Interval::OneDay).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_search_quote_name_fallback() {
        let body = r#"{"quotes":[
            {"symbol":"AAPL","shortname":"Apple Inc.","exchDisp":"NASDAQ"},
            {"symbol":"SAP.DE","shortname":"","longname":"SAP SE","exchDisp":"XETRA"},
            {"symbol":"^XU100"}
        ]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let matches: Vec<SymbolMatch> =
            response.quotes.into_iter().map(SearchQuote::into_match).collect();

        assert_eq!(matches[0].name, "Apple Inc.");
        assert_eq!(matches[1].name, "SAP SE");
        assert_eq!(matches[1].exchange, "XETRA");
        assert_eq!(matches[2].name, "");
        assert_eq!(matches[2].exchange, "");
    }

    #[test]
    fn test_day_timestamp() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(day_timestamp(day), 1704153600);
    }
}
