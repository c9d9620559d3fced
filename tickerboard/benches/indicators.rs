use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;
use tickerboard::data::PriceSeries;
use tickerboard::export::{build_export, prepare_instruments};
use tickerboard::indicators::compute_indicators;

fn series(symbol: &str, n: usize) -> PriceSeries {
    let closes: Vec<f64> = (0..n)
        .map(|i| 100.0 + (i as f64 * 0.05).sin() * 10.0 + i as f64 * 0.01)
        .collect();
    PriceSeries::from_closes(
        symbol,
        Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap(),
        Duration::days(1),
        &closes,
    )
}

fn bench_indicators(c: &mut Criterion) {
    let ten_years = series("BENCH", 2520);
    c.bench_function("compute_indicators 2520 bars", |b| {
        b.iter(|| compute_indicators(black_box(&ten_years)))
    });

    let instruments = prepare_instruments((0..20).map(|i| series(&format!("SYM{i}"), 2520)));
    c.bench_function("build_export 20 symbols", |b| {
        b.iter(|| build_export(black_box(&instruments), &HashMap::new()))
    });
}

criterion_group!(benches, bench_indicators);
criterion_main!(benches);
