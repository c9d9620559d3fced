//! Unit tests for the indicator pipeline

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use tickerboard::data::{PriceBar, PriceSeries};
    use tickerboard::indicators::{
        calculate_ema, compute_indicators, Indicator, IndicatorRow, EMA, RSI, SMA,
    };

    const TOL: f64 = 1e-9;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(
            "TEST",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Duration::days(1),
            closes,
        )
    }

    fn zigzag(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn test_rsi_undefined_below_fourteen_bars() {
        for n in 0..14 {
            let rows = compute_indicators(&series(&zigzag(n)));
            assert_eq!(rows.len(), n);
            assert!(rows.iter().all(|r| r.rsi14.is_none()), "len {n}");
        }
    }

    #[test]
    fn test_bollinger_ordering_on_rising_closes() {
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + i as f64 * 1.5).collect();
        let rows = compute_indicators(&series(&closes));

        let defined: Vec<&IndicatorRow> = rows.iter().filter(|r| r.bb_ma20.is_some()).collect();
        assert_eq!(defined.len(), 21);
        for row in defined {
            let (upper, mid, lower) = (
                row.bb_upper.unwrap(),
                row.bb_ma20.unwrap(),
                row.bb_lower.unwrap(),
            );
            assert!(upper > mid && mid > lower);
        }
    }

    #[test]
    fn test_bollinger_collapses_on_flat_window() {
        let rows = compute_indicators(&series(&[42.0; 25]));
        let last = rows.last().unwrap();
        assert_eq!(last.bb_upper, last.bb_ma20);
        assert_eq!(last.bb_lower, last.bb_ma20);
    }

    #[test]
    fn test_cum_return_matches_product_of_returns() {
        let rows = compute_indicators(&series(&zigzag(60)));
        assert_eq!(rows[0].cum_return, None);

        let mut product = 1.0;
        for row in rows.iter().skip(1) {
            product *= 1.0 + row.ret.unwrap();
            assert!((1.0 + row.cum_return.unwrap() - product).abs() < TOL);
        }
    }

    #[test]
    fn test_rsi_saturates_on_rising_closes() {
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + i as f64).collect();
        let rows = compute_indicators(&series(&closes));
        for (i, row) in rows.iter().enumerate() {
            if i < 14 {
                assert_eq!(row.rsi14, None);
            } else {
                assert_eq!(row.rsi14, Some(100.0));
            }
        }
    }

    #[test]
    fn test_rsi_flat_is_undefined_not_fifty() {
        let mut closes = vec![100.0; 20];
        closes.extend([101.0, 102.0]);
        let rows = compute_indicators(&series(&closes));
        assert!(rows[..20].iter().all(|r| r.rsi14.is_none()));
        assert_eq!(rows[20].rsi14, Some(100.0));
    }

    #[test]
    fn test_sma_and_ema_values() {
        let closes: Vec<f64> = (1..=50).map(|v| v as f64).collect();
        let rows = compute_indicators(&series(&closes));

        // mean of 1..=20
        assert!((rows[19].sma20.unwrap() - 10.5).abs() < TOL);
        assert!((rows[49].sma50.unwrap() - 25.5).abs() < TOL);

        let alpha = 2.0 / 21.0;
        let mut ema = 1.0;
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                ema = alpha * closes[i] + (1.0 - alpha) * ema;
            }
            assert!((row.ema20.unwrap() - ema).abs() < TOL);
        }
    }

    #[test]
    fn test_volatility_uses_sample_std() {
        let closes = zigzag(21);
        let rows = compute_indicators(&series(&closes));
        assert!(rows[..20].iter().all(|r| r.volatility.is_none()));

        let returns: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let mean = returns.iter().sum::<f64>() / 20.0;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 19.0;
        let expected = var.sqrt() * 252f64.sqrt();
        assert!((rows[20].volatility.unwrap() - expected).abs() < TOL);
    }

    #[test]
    fn test_gap_propagates() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut bars: Vec<PriceBar> = (0..30)
            .map(|i| PriceBar::close_only(t0 + Duration::days(i), Some(100.0 + i as f64)))
            .collect();
        bars[5].close = None;
        let rows = compute_indicators(&PriceSeries::new("GAP", bars));

        assert_eq!(rows[5].ret, None);
        assert_eq!(rows[6].ret, None);
        assert!(rows[7].ret.is_some());
        // window 5..=24 holds the gap
        assert_eq!(rows[24].sma20, None);
        assert!(rows[25].sma20.is_some());
        assert_eq!(rows[5].ema20, rows[4].ema20);
    }

    #[test]
    fn test_streaming_indicators() {
        let mut rsi = RSI::new(14);
        let mut sma = SMA::new(10);
        let mut ema = EMA::new(10);
        assert_eq!(rsi.name(), "RSI");
        assert_eq!(sma.period(), 10);
        assert!(!ema.is_ready());

        for i in 0..20 {
            let v = Some(100.0 + (i % 4) as f64);
            rsi.update(v);
            sma.update(v);
            ema.update(v);
        }

        assert!(rsi.is_ready() && sma.is_ready() && ema.is_ready());
        let value = rsi.value().unwrap();
        assert!((0.0..=100.0).contains(&value));
        assert_eq!(calculate_ema(&[], 10), Vec::<Option<f64>>::new());
    }
}
