//! Raw bars joined with their indicator rows

use crate::data::{PriceBar, PriceSeries};
use crate::export::{Cell, Column, Sheet};
use crate::indicators::IndicatorRow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

pub const DATE_COLUMN: &str = "Date";

/// One bar with its indicators, if any were computed for that date.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub bar: PriceBar,
    pub indicators: Option<IndicatorRow>,
}

impl JoinedRow {
    pub fn date(&self) -> DateTime<Utc> {
        self.bar.date
    }
}

/// Left join of an instrument's bars with its indicator table, keyed by date.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentTable {
    symbol: String,
    rows: Vec<JoinedRow>,
}

impl InstrumentTable {
    /// Every bar of `raw` yields one row; a date missing from `indicators`
    /// gets blank indicator cells.
    pub fn join(raw: &PriceSeries, indicators: &[IndicatorRow]) -> Self {
        let by_date: HashMap<DateTime<Utc>, &IndicatorRow> =
            indicators.iter().map(|row| (row.date, row)).collect();

        let rows = raw
            .bars()
            .iter()
            .map(|bar| JoinedRow {
                bar: bar.clone(),
                indicators: by_date.get(&bar.date).map(|row| (*row).clone()),
            })
            .collect();

        Self {
            symbol: raw.symbol().to_string(),
            rows,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom
    pub fn column(&self, column: Column) -> Vec<Option<f64>> {
        self.rows.iter().map(|row| column.value(row)).collect()
    }

    /// Summary from the most recent row whose reported fields are all defined
    pub fn summary(&self) -> Option<SummaryRecord> {
        self.rows.iter().rev().find_map(|row| {
            Some(SummaryRecord {
                symbol: self.symbol.clone(),
                last_close: Column::Close.value(row)?,
                cum_return: Column::CumReturn.value(row)?,
                volatility: Column::Volatility.value(row)?,
                rsi14: Column::Rsi14.value(row)?,
            })
        })
    }

    /// Render as a sheet: a leading `Date` column, then `columns` in the
    /// order given.
    pub fn to_sheet(&self, name: impl Into<String>, columns: &[Column]) -> Sheet {
        let mut header = Vec::with_capacity(columns.len() + 1);
        header.push(DATE_COLUMN.to_string());
        header.extend(columns.iter().map(|c| c.name().to_string()));

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(columns.len() + 1);
                cells.push(Cell::Date(row.date()));
                cells.extend(columns.iter().map(|c| Cell::from(c.value(row))));
                cells
            })
            .collect();

        Sheet::new(name, header, rows)
    }
}

/// Latest fully computed figures for one instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "LastClose")]
    pub last_close: f64,
    #[serde(rename = "CumReturn")]
    pub cum_return: f64,
    #[serde(rename = "Volatility")]
    pub volatility: f64,
    #[serde(rename = "RSI14")]
    pub rsi14: f64,
}

impl SummaryRecord {
    pub const COLUMNS: [&'static str; 5] = ["Symbol", "LastClose", "CumReturn", "Volatility", "RSI14"];

    pub fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.symbol.clone()),
            Cell::Number(self.last_close),
            Cell::Number(self.cum_return),
            Cell::Number(self.volatility),
            Cell::Number(self.rsi14),
        ]
    }
}
