//! Unit tests for the Bollinger breakout strategy

use confluence::models::signal::Direction;
use confluence::models::strategy::{BollingerParams, RiskParams, StrategyId};
use confluence::strategies::{BollingerBreakoutStrategy, CandleWindow, Strategy};

use crate::test_utils::create_test_candles;

/// Fifty bars alternating tightly around 100
fn squeeze() -> Vec<f64> {
    (0..50)
        .map(|i| if i % 2 == 0 { 100.1 } else { 99.9 })
        .collect()
}

fn strategy() -> BollingerBreakoutStrategy {
    BollingerBreakoutStrategy::new(BollingerParams::default(), RiskParams::default())
}

#[test]
fn test_buy_after_squeeze() {
    let mut closes = squeeze();
    closes.extend([103.0, 104.0]);
    let candles = create_test_candles(&closes);
    let window = CandleWindow::new("ETH/USDT", "4h", &candles);

    let signal = strategy().analyze(&window).unwrap().unwrap();
    assert_eq!(signal.strategy, StrategyId::BollingerBreakout);
    assert_eq!(signal.direction, Direction::Buy);
    assert!((signal.score - 0.913570).abs() < 1e-5);
    assert!((signal.target - 108.924927).abs() < 1e-5);
    assert!((signal.stop_loss - 101.537536).abs() < 1e-5);
    assert!(signal.reason.contains("squeeze"));
}

#[test]
fn test_short_after_squeeze() {
    let mut closes = squeeze();
    closes.extend([97.0, 96.0]);
    let candles = create_test_candles(&closes);
    let window = CandleWindow::new("ETH/USDT", "4h", &candles);

    let signal = strategy().analyze(&window).unwrap().unwrap();
    assert_eq!(signal.direction, Direction::Short);
    assert!((signal.score - 0.913570).abs() < 1e-5);
}

#[test]
fn test_single_bar_outside_is_not_confirmed() {
    let mut closes = squeeze();
    closes.push(103.0);
    let candles = create_test_candles(&closes);
    let window = CandleWindow::new("ETH/USDT", "4h", &candles);
    assert!(strategy().analyze(&window).unwrap().is_none());
}

#[test]
fn test_short_window_abstains() {
    let candles = create_test_candles(&squeeze()[..30]);
    let window = CandleWindow::new("ETH/USDT", "4h", &candles);
    assert!(strategy().analyze(&window).unwrap().is_none());
}
