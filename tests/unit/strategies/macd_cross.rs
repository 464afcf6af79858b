//! Unit tests for the MACD crossover strategy

use confluence::models::signal::Direction;
use confluence::models::strategy::{MacdCrossParams, RiskParams, StrategyId};
use confluence::strategies::{CandleWindow, MacdCrossStrategy, Strategy};

use crate::test_utils::create_test_candles;

/// Accelerating move of forty bars, then a steady reversal of three points
/// per bar
fn reversal(start: f64, sign: f64, len: usize) -> Vec<f64> {
    let trend: Vec<f64> = (0..40).map(|i| start - sign * 0.05 * (i * i) as f64).collect();
    let turn = trend[39];
    trend
        .into_iter()
        .chain((1..15).map(|j| turn + sign * 3.0 * j as f64))
        .take(len)
        .collect()
}

fn strategy() -> MacdCrossStrategy {
    MacdCrossStrategy::new(MacdCrossParams::default(), RiskParams::default())
}

#[test]
fn test_bullish_cross_below_zero() {
    let candles = create_test_candles(&reversal(200.0, 1.0, 44));
    let window = CandleWindow::new("BTC/USDT", "1h", &candles);

    let signal = strategy().analyze(&window).unwrap().unwrap();
    assert_eq!(signal.strategy, StrategyId::MacdCross);
    assert_eq!(signal.direction, Direction::Buy);
    assert!((signal.score - 0.666017).abs() < 1e-5);
    assert!((signal.target - 148.292966).abs() < 1e-5);
    assert!((signal.stop_loss - 129.778517).abs() < 1e-5);
    assert!(signal.reason.contains("below zero"));
}

#[test]
fn test_bearish_cross_above_zero() {
    let candles = create_test_candles(&reversal(100.0, -1.0, 44));
    let window = CandleWindow::new("BTC/USDT", "1h", &candles);

    let signal = strategy().analyze(&window).unwrap().unwrap();
    assert_eq!(signal.direction, Direction::Short);
    assert!((signal.score - 0.666017).abs() < 1e-5);
}

#[test]
fn test_no_signal_before_the_cross() {
    let candles = create_test_candles(&reversal(200.0, 1.0, 43));
    let window = CandleWindow::new("BTC/USDT", "1h", &candles);
    assert!(strategy().analyze(&window).unwrap().is_none());
}

#[test]
fn test_steady_trend_is_not_a_cross() {
    let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
    let candles = create_test_candles(&closes);
    for end in 35..=closes.len() {
        let window = CandleWindow::new("BTC/USDT", "1h", &candles[..end]);
        assert!(strategy().analyze(&window).unwrap().is_none(), "spurious cross at {}", end);
    }
}
