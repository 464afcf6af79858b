//! Unit tests for ATR and Bollinger Bands

use confluence::indicators::volatility::{atr_series, bollinger_series, calculate_atr};

use crate::test_utils::{create_flat_candles, create_test_candles};

#[test]
fn test_atr_insufficient_data() {
    let candles = create_test_candles(&[100.0; 20]);
    assert!(calculate_atr(&candles[..14], 14).is_none());
    assert!(calculate_atr(&candles[..15], 14).is_some());
}

#[test]
fn test_atr_of_constant_range() {
    let candles = create_test_candles(&[100.0; 30]);
    let atr = calculate_atr(&candles, 14).unwrap();
    assert!((atr.value - 1.0).abs() < 1e-9);
    assert_eq!(atr.period, 14);
}

#[test]
fn test_atr_series_starts_at_period() {
    let candles = create_test_candles(&[100.0; 20]);
    let series = atr_series(&candles, 14);
    assert!(series[13].is_nan());
    assert!(series[14].is_finite());
}

#[test]
fn test_atr_includes_gaps() {
    let mut closes = vec![100.0; 20];
    closes.push(110.0);
    let candles = create_test_candles(&closes);
    let quiet = calculate_atr(&candles[..20], 14).unwrap();
    let gapped = calculate_atr(&candles, 14).unwrap();
    assert!(gapped.value > quiet.value);
}

#[test]
fn test_bollinger_warm_up() {
    let series = bollinger_series(&[100.0; 19], 20, 2.0);
    assert!(series.middle.iter().all(|v| v.is_nan()));
}

#[test]
fn test_bollinger_flat_market_collapses() {
    let closes: Vec<f64> = create_flat_candles(25, 100.0).iter().map(|c| c.close).collect();
    let series = bollinger_series(&closes, 20, 2.0);
    assert!((series.upper[24] - 100.0).abs() < 1e-9);
    assert!((series.lower[24] - 100.0).abs() < 1e-9);
    assert!(series.bandwidth(24).abs() < 1e-9);
}

#[test]
fn test_bollinger_band_order() {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.9).sin() * 3.0).collect();
    let series = bollinger_series(&closes, 20, 2.0);
    assert!(series.upper[39] > series.middle[39]);
    assert!(series.middle[39] > series.lower[39]);
}

#[test]
fn test_bollinger_series_bandwidth() {
    let closes: Vec<f64> = (0..50)
        .map(|i| if i % 2 == 0 { 100.1 } else { 99.9 })
        .collect();
    let series = bollinger_series(&closes, 20, 2.0);
    assert!(series.middle[18].is_nan());
    assert!((series.bandwidth(49) - 0.004).abs() < 1e-9);
}
