//! Example: build indicator sheets for two synthetic symbols and write them as CSV

use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use tickerboard::data::PriceSeries;
use tickerboard::export::{build_export, prepare_instruments, CsvSink, XlsxSink};
use tickerboard::Result;

fn synthetic(symbol: &str, base: f64, count: usize) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let swing = (i as f64 % 7.0) * 0.4;
            let trend = if i < count / 2 { 0.3 } else { -0.2 };
            base + i as f64 * trend + swing
        })
        .collect();
    PriceSeries::from_closes(symbol, start, Duration::days(1), &closes)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let instruments = prepare_instruments(vec![
        synthetic("DEMO", 100.0, 120),
        synthetic("SHORT", 20.0, 10),
    ]);

    let mut selected = HashMap::new();
    selected.insert(
        "DEMO".to_string(),
        vec!["Close".to_string(), "SMA20".to_string(), "RSI14".to_string()],
    );

    let document = build_export(&instruments, &selected);
    println!("Sheets: {:?}", document.sheet_names());

    if let Some(summary) = document.summary() {
        for row in summary.rows() {
            println!("{:?}", row);
        }
    }

    let paths = CsvSink::new("./exports/demo").write(&document)?;
    for path in paths {
        println!("Wrote {}", path.display());
    }
    let workbook = XlsxSink::new("./exports/demo/demo.xlsx").write(&document)?;
    println!("Wrote {}", workbook.display());

    Ok(())
}
