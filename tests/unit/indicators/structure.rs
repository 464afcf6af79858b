//! Unit tests for swings, support/resistance clustering and regression channels

use chrono::Duration;
use confluence::indicators::structure::{
    calculate_regression_channel, calculate_support_resistance, cluster_levels, find_swing_highs,
    find_swing_lows,
};
use confluence::models::indicators::Candle;

use crate::test_utils::{base_time, create_candles_with_volume};

fn rising_channel(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = 50.0 + 0.2 * i as f64;
            Candle::new(close, close + 1.0, close - 1.0, close, 1000.0, base_time() + Duration::hours(i as i64))
        })
        .collect()
}

#[test]
fn test_swing_low_in_valley() {
    let lows = find_swing_lows(&[5.0, 3.0, 1.0, 3.0, 5.0], 1);
    assert_eq!(lows.len(), 1);
    assert_eq!(lows[0].index, 2);
    assert_eq!(lows[0].value, 1.0);
}

#[test]
fn test_swing_high_on_peak() {
    let highs = find_swing_highs(&[1.0, 3.0, 5.0, 3.0, 1.0], 1);
    assert_eq!(highs.len(), 1);
    assert_eq!(highs[0].index, 2);
}

#[test]
fn test_swings_never_at_edges() {
    assert!(find_swing_lows(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).is_empty());
    assert!(find_swing_highs(&[5.0, 4.0, 3.0], 2).is_empty());
}

#[test]
fn test_cluster_levels_merges_within_tolerance() {
    let levels = cluster_levels(&[105.0, 100.0, 100.3], 0.005);
    assert_eq!(levels.len(), 2);
    assert!((levels[0].price - 100.15).abs() < 1e-9);
    assert_eq!(levels[0].touches, 2);
    assert_eq!(levels[1].price, 105.0);
    assert_eq!(levels[1].touches, 1);
}

#[test]
fn test_support_resistance_from_oscillation() {
    let cycle = [100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 108.0, 106.0, 104.0, 102.0];
    let closes: Vec<f64> = (0..55).map(|i| cycle[i % 10]).collect();
    let candles = create_candles_with_volume(&closes, &vec![1000.0; closes.len()]);

    let levels = calculate_support_resistance(&candles, 50, 2, 0.005, 2).unwrap();
    assert!(levels
        .resistance
        .iter()
        .any(|l| (l.price - 110.5).abs() < 1e-9 && l.touches == 8));
    assert!(levels.support.iter().all(|l| l.touches >= 2));
    assert!(calculate_support_resistance(&candles, 60, 2, 0.005, 2).is_none());
}

#[test]
fn test_regression_channel_projects_one_bar() {
    let candles = rising_channel(60);
    let channel = calculate_regression_channel(&candles, 50).unwrap();
    assert!((channel.upper - 63.0).abs() < 1e-9);
    assert!((channel.lower - 61.0).abs() < 1e-9);
    assert!((channel.fit_quality() - 1.0).abs() < 1e-9);
    assert!((channel.width() - 2.0 / 62.0).abs() < 1e-9);
}

#[test]
fn test_regression_channel_insufficient_data() {
    let candles = rising_channel(10);
    assert!(calculate_regression_channel(&candles, 50).is_none());
    assert!(calculate_regression_channel(&candles, 1).is_none());
}
