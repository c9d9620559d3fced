//! Tickerboard: indicator pipeline and spreadsheet export for multi-symbol
//! market dashboards
//!
//! # Features
//!
//! - **Data**: OHLCV bars with gaps, immutable per-query series, intervals
//!   and the fetcher contract
//! - **Technical Indicators**: returns, cumulative return, SMA, EMA,
//!   volatility, RSI, Bollinger Bands
//! - **Export**: joined tables, column selection, per-symbol sheets plus a
//!   summary sheet, CSV and JSON sinks
//! - **Statistics**: whole-range descriptive statistics and quote overview
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use tickerboard::prelude::*;
//!
//! fn export(series: Vec<PriceSeries>) -> Result<Vec<std::path::PathBuf>> {
//!     let instruments = prepare_instruments(series);
//!     let document = build_export(&instruments, &HashMap::new());
//!     CsvSink::new("./exports").write(&document)
//! }
//! ```

pub mod config;
pub mod data;
pub mod export;
pub mod indicators;
pub mod stats;

// Re-export commonly used types
pub mod prelude {
    pub use crate::config::*;
    pub use crate::data::*;
    pub use crate::export::*;
    pub use crate::indicators::*;
    pub use crate::stats::*;

    pub use anyhow::{Context, Result};
}

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
