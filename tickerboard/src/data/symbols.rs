//! Ticker input handling
//!
//! Symbols follow the Yahoo Finance suffix convention: `THYAO.IS` (Istanbul),
//! `7203.T` (Tokyo), `HSBA.L` (London), `SAP.DE` (XETRA), `0700.HK`,
//! `RELIANCE.NS`, and a `^` prefix for indices such as `^XU100`.

use serde::{Deserialize, Serialize};

/// One hit from a symbol search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
}

/// Split free-form ticker input on commas, semicolons and newlines.
///
/// Entries are trimmed and upper-cased; empty entries and repeats are dropped,
/// first occurrence order is kept.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split([',', ';', '\n', '\r']) {
        let ticker = part.trim().to_uppercase();
        if !ticker.is_empty() && !out.contains(&ticker) {
            out.push(ticker);
        }
    }
    out
}

/// Whether a search query is already a symbol and can skip the search call.
pub fn looks_like_symbol(query: &str) -> bool {
    let q = query.trim();
    if q.is_empty() {
        return false;
    }
    q.contains('.') || (q.chars().any(|c| c.is_alphabetic()) && q == q.to_uppercase())
}
