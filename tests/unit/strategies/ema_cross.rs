//! Unit tests for the EMA crossover strategy

use confluence::models::signal::Direction;
use confluence::models::strategy::{EmaCrossParams, RiskParams, StrategyId};
use confluence::strategies::{CandleWindow, EmaCrossStrategy, Strategy};

use crate::test_utils::create_test_candles;

fn fast_params() -> EmaCrossParams {
    EmaCrossParams {
        fast_period: 5,
        slow_period: 20,
        adx_period: 14,
        min_adx: 25.0,
    }
}

fn reversal(first: f64, step: f64, len: usize) -> Vec<f64> {
    (0..40)
        .map(|i| first - step * i as f64)
        .chain((1..30).map(|j| first - step * 39.0 + 2.0 * step * j as f64))
        .take(len)
        .collect()
}

#[test]
fn test_golden_cross_with_strong_trend() {
    let candles = create_test_candles(&reversal(150.0, 1.0, 47));
    let window = CandleWindow::new("BTC/USDT", "1d", &candles);
    let strategy = EmaCrossStrategy::new(fast_params(), RiskParams::default());

    let signal = strategy.analyze(&window).unwrap().unwrap();
    assert_eq!(signal.strategy, StrategyId::EmaCross);
    assert_eq!(signal.direction, Direction::Buy);
    assert!((signal.score - 0.9).abs() < 1e-9);
    assert!((signal.target - 132.894090).abs() < 1e-5);
    assert!((signal.stop_loss - 121.052955).abs() < 1e-5);
    assert!(signal.reason.starts_with("Golden cross EMA5/EMA20"));
}

#[test]
fn test_death_cross_with_strong_trend() {
    let candles = create_test_candles(&reversal(100.0, -1.0, 47));
    let window = CandleWindow::new("BTC/USDT", "1d", &candles);
    let strategy = EmaCrossStrategy::new(fast_params(), RiskParams::default());

    let signal = strategy.analyze(&window).unwrap().unwrap();
    assert_eq!(signal.direction, Direction::Short);
    assert!((signal.score - 0.9).abs() < 1e-9);
}

#[test]
fn test_weak_trend_is_filtered() {
    let params = EmaCrossParams {
        min_adx: 80.0,
        ..fast_params()
    };
    let candles = create_test_candles(&reversal(150.0, 1.0, 47));
    let window = CandleWindow::new("BTC/USDT", "1d", &candles);
    let strategy = EmaCrossStrategy::new(params, RiskParams::default());
    assert!(strategy.analyze(&window).unwrap().is_none());
}

#[test]
fn test_default_periods_need_long_history() {
    let strategy = EmaCrossStrategy::new(EmaCrossParams::default(), RiskParams::default());
    assert_eq!(strategy.min_candles(), 201);
}
