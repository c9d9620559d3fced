//! Canonical table columns and column selection

use crate::export::JoinedRow;
use std::collections::BTreeSet;

/// Columns of a joined instrument table, declared in canonical order.
///
/// `AdjClose` is display only. It is not part of `ALL` and cannot be
/// selected for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
    Return,
    CumReturn,
    Sma20,
    Sma50,
    Ema20,
    Volatility,
    Rsi14,
    BbMa20,
    BbUpper,
    BbLower,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
        Column::Return,
        Column::CumReturn,
        Column::Sma20,
        Column::Sma50,
        Column::Ema20,
        Column::Volatility,
        Column::Rsi14,
        Column::BbMa20,
        Column::BbUpper,
        Column::BbLower,
    ];

    /// Columns of the on-screen instrument table
    pub const PRESENTATION: [Column; 16] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::AdjClose,
        Column::Volume,
        Column::Return,
        Column::CumReturn,
        Column::Sma20,
        Column::Sma50,
        Column::Ema20,
        Column::Volatility,
        Column::Rsi14,
        Column::BbMa20,
        Column::BbUpper,
        Column::BbLower,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Open => "Open",
            Column::High => "High",
            Column::Low => "Low",
            Column::Close => "Close",
            Column::AdjClose => "Adj Close",
            Column::Volume => "Volume",
            Column::Return => "Return",
            Column::CumReturn => "CumReturn",
            Column::Sma20 => "SMA20",
            Column::Sma50 => "SMA50",
            Column::Ema20 => "EMA20",
            Column::Volatility => "Volatility",
            Column::Rsi14 => "RSI14",
            Column::BbMa20 => "BB_MA20",
            Column::BbUpper => "BB_Upper",
            Column::BbLower => "BB_Lower",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Cell value of this column in a joined row
    pub fn value(self, row: &JoinedRow) -> Option<f64> {
        let ind = row.indicators.as_ref();
        match self {
            Column::Open => row.bar.open,
            Column::High => row.bar.high,
            Column::Low => row.bar.low,
            Column::Close => row.bar.close,
            Column::AdjClose => row.bar.adj_close,
            Column::Volume => row.bar.volume,
            Column::Return => ind?.ret,
            Column::CumReturn => ind?.cum_return,
            Column::Sma20 => ind?.sma20,
            Column::Sma50 => ind?.sma50,
            Column::Ema20 => ind?.ema20,
            Column::Volatility => ind?.volatility,
            Column::Rsi14 => ind?.rsi14,
            Column::BbMa20 => ind?.bb_ma20,
            Column::BbUpper => ind?.bb_upper,
            Column::BbLower => ind?.bb_lower,
        }
    }
}

/// Resolve a user column selection into canonical order.
///
/// Unknown names are ignored and repeats collapse. A selection that names no
/// known column keeps every column.
pub fn select_columns<S: AsRef<str>>(names: &[S]) -> Vec<Column> {
    let picked: BTreeSet<Column> = names
        .iter()
        .filter_map(|n| Column::from_name(n.as_ref()))
        .collect();

    if picked.is_empty() {
        Column::ALL.to_vec()
    } else {
        picked.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert_eq!(Column::from_name("sma20"), None);
    }

    #[test]
    fn test_adj_close_is_display_only() {
        assert!(!Column::ALL.contains(&Column::AdjClose));
        assert_eq!(Column::from_name("Adj Close"), None);
        assert_eq!(select_columns(&["Adj Close"]), Column::ALL.to_vec());

        let shown: Vec<Column> = Column::PRESENTATION
            .into_iter()
            .filter(|c| *c != Column::AdjClose)
            .collect();
        assert_eq!(shown, Column::ALL.to_vec());
        assert_eq!(Column::PRESENTATION[4].name(), "Adj Close");
    }

    #[test]
    fn test_selection_is_canonical() {
        let cols = select_columns(&["RSI14", "Close", "Bogus", "Return", "Close"]);
        assert_eq!(cols, vec![Column::Close, Column::Return, Column::Rsi14]);
    }

    #[test]
    fn test_empty_or_unknown_selection_keeps_all() {
        let none: [&str; 0] = [];
        assert_eq!(select_columns(&none), Column::ALL.to_vec());
        assert_eq!(select_columns(&["nope"]), Column::ALL.to_vec());
    }
}
