//! Multi-instrument export assembly

use crate::data::PriceSeries;
use crate::export::{
    select_columns, sheet_name, Cell, Column, ExportDocument, InstrumentTable, Sheet,
    SummaryRecord, MAX_SHEET_NAME_LEN, SUMMARY_SHEET,
};
use crate::indicators::{compute_indicators, IndicatorRow};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Raw bars of one instrument with their computed indicators
#[derive(Debug, Clone)]
pub struct InstrumentData {
    pub raw: PriceSeries,
    pub indicators: Vec<IndicatorRow>,
}

impl InstrumentData {
    /// Run the indicator pipeline over `raw`
    pub fn from_series(raw: PriceSeries) -> Self {
        let indicators = compute_indicators(&raw);
        Self { raw, indicators }
    }

    pub fn table(&self) -> InstrumentTable {
        InstrumentTable::join(&self.raw, &self.indicators)
    }
}

/// Compute indicators for every series, keyed by symbol.
pub fn prepare_instruments<I>(series: I) -> BTreeMap<String, InstrumentData>
where
    I: IntoIterator<Item = PriceSeries>,
{
    series
        .into_iter()
        .map(|s| (s.symbol().to_string(), InstrumentData::from_series(s)))
        .collect()
}

/// Build the export document: one sheet per symbol in symbol order, then a
/// `Summary` sheet when at least one symbol has a fully computed row.
///
/// Symbols with no bars are skipped. Selections for unknown symbols are
/// ignored; a missing or empty selection keeps every column.
pub fn build_export(
    per_instrument: &BTreeMap<String, InstrumentData>,
    selected: &HashMap<String, Vec<String>>,
) -> ExportDocument {
    let mut sheets = Vec::with_capacity(per_instrument.len() + 1);
    let mut summaries = Vec::new();
    let mut names = SheetNames::default();
    names.reserve(SUMMARY_SHEET);

    for (symbol, data) in per_instrument {
        if data.raw.is_empty() {
            debug!("Skipping {}: no bars", symbol);
            continue;
        }

        let table = data.table();
        let columns = match selected.get(symbol) {
            Some(wanted) => select_columns(wanted),
            None => Column::ALL.to_vec(),
        };

        sheets.push(table.to_sheet(names.claim(symbol), &columns));

        match table.summary() {
            Some(record) => summaries.push(record),
            None => debug!("No fully computed row for {}", symbol),
        }
    }

    if !summaries.is_empty() {
        sheets.push(summary_sheet(&summaries));
    }

    ExportDocument::new(sheets)
}

pub fn summary_sheet(records: &[SummaryRecord]) -> Sheet {
    Sheet::new(
        SUMMARY_SHEET,
        SummaryRecord::COLUMNS.iter().map(|c| c.to_string()).collect(),
        records.iter().map(SummaryRecord::cells).collect::<Vec<Vec<Cell>>>(),
    )
}

/// Hands out sheet names unique within one document, compared without case.
#[derive(Debug, Default)]
struct SheetNames {
    used: HashSet<String>,
}

impl SheetNames {
    fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_lowercase());
    }

    fn claim(&mut self, symbol: &str) -> String {
        let base = sheet_name(symbol);
        if self.used.insert(base.to_lowercase()) {
            return base;
        }

        let mut n = 2;
        loop {
            let suffix = format!("~{}", n);
            let stem: String = base.chars().take(MAX_SHEET_NAME_LEN - suffix.len()).collect();
            let candidate = format!("{}{}", stem, suffix);
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_names_unique() {
        let mut names = SheetNames::default();
        names.reserve(SUMMARY_SHEET);
        let long_a = format!("{}A", "X".repeat(31));
        let long_b = format!("{}B", "X".repeat(31));

        assert_eq!(names.claim(&long_a), "X".repeat(31));
        let second = names.claim(&long_b);
        assert_eq!(second, format!("{}~2", "X".repeat(29)));
        assert_eq!(second.chars().count(), MAX_SHEET_NAME_LEN);
        assert_eq!(names.claim("summary"), "summary~2");
    }
}
