//! Per-instrument indicator table

use crate::data::PriceSeries;
use crate::indicators::{
    calculate_cum_returns, calculate_returns, BollingerBands, Indicator, Volatility, EMA, RSI, SMA,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SMA_SHORT_PERIOD: usize = 20;
pub const SMA_LONG_PERIOD: usize = 50;
pub const EMA_SPAN: usize = 20;
pub const VOLATILITY_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const BB_PERIOD: usize = 20;
pub const BB_MULTIPLIER: f64 = 2.0;

/// Derived values for one bar. `None` means not yet defined (warmup or gap).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    #[serde(rename = "Date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "Close")]
    pub close: Option<f64>,
    #[serde(rename = "Return")]
    pub ret: Option<f64>,
    #[serde(rename = "CumReturn")]
    pub cum_return: Option<f64>,
    #[serde(rename = "SMA20")]
    pub sma20: Option<f64>,
    #[serde(rename = "SMA50")]
    pub sma50: Option<f64>,
    #[serde(rename = "EMA20")]
    pub ema20: Option<f64>,
    #[serde(rename = "Volatility")]
    pub volatility: Option<f64>,
    #[serde(rename = "RSI14")]
    pub rsi14: Option<f64>,
    #[serde(rename = "BB_MA20")]
    pub bb_ma20: Option<f64>,
    #[serde(rename = "BB_Upper")]
    pub bb_upper: Option<f64>,
    #[serde(rename = "BB_Lower")]
    pub bb_lower: Option<f64>,
}

/// Compute the indicator table, one row per bar with the bar's date.
///
/// An empty series gives an empty table.
pub fn compute_indicators(series: &PriceSeries) -> Vec<IndicatorRow> {
    let closes = series.closes();
    let returns = calculate_returns(&closes);
    let cum_returns = calculate_cum_returns(&returns);

    let mut sma20 = SMA::new(SMA_SHORT_PERIOD);
    let mut sma50 = SMA::new(SMA_LONG_PERIOD);
    let mut ema20 = EMA::new(EMA_SPAN);
    let mut volatility = Volatility::new(VOLATILITY_PERIOD);
    let mut rsi = RSI::new(RSI_PERIOD);
    let mut bb = BollingerBands::new(BB_PERIOD, BB_MULTIPLIER);

    series
        .bars()
        .iter()
        .zip(returns.into_iter().zip(cum_returns))
        .map(|(bar, (ret, cum_return))| {
            let close = bar.close;
            sma20.update(close);
            sma50.update(close);
            ema20.update(close);
            volatility.update(ret);
            rsi.update(close);
            bb.update(close);

            IndicatorRow {
                date: bar.date,
                close,
                ret,
                cum_return,
                sma20: sma20.value(),
                sma50: sma50.value(),
                ema20: ema20.value(),
                volatility: volatility.value(),
                rsi14: rsi.value(),
                bb_ma20: bb.middle(),
                bb_upper: bb.upper(),
                bb_lower: bb.lower(),
            }
        })
        .collect()
}
