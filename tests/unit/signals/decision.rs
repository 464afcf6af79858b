//! Unit tests for target and stop sizing

use confluence::models::signal::Direction;
use confluence::models::strategy::RiskParams;
use confluence::signals::decision::StopLossTakeProfit;

#[test]
fn test_atr_levels_for_buy() {
    let levels = StopLossTakeProfit::calculate_from_atr(Direction::Buy, 100.0, 2.0, &RiskParams::default()).unwrap();
    // stop distance 2 × 1.5 = 3, target distance 3 × 2 = 6
    assert!((levels.stop_loss - 97.0).abs() < 1e-9);
    assert!((levels.target - 106.0).abs() < 1e-9);
}

#[test]
fn test_atr_levels_for_short() {
    let levels =
        StopLossTakeProfit::calculate_from_atr(Direction::Short, 100.0, 2.0, &RiskParams::default()).unwrap();
    assert!((levels.stop_loss - 103.0).abs() < 1e-9);
    assert!((levels.target - 94.0).abs() < 1e-9);
}

#[test]
fn test_percent_levels() {
    let levels = StopLossTakeProfit::calculate_from_percent(Direction::Buy, 200.0, &RiskParams::default()).unwrap();
    assert!((levels.stop_loss - 197.0).abs() < 1e-9);
    assert!((levels.target - 206.0).abs() < 1e-9);

    let levels =
        StopLossTakeProfit::calculate_from_percent(Direction::Short, 200.0, &RiskParams::default()).unwrap();
    assert!((levels.stop_loss - 203.0).abs() < 1e-9);
    assert!((levels.target - 194.0).abs() < 1e-9);
}

#[test]
fn test_custom_risk_reward() {
    let risk = RiskParams {
        risk_reward_ratio: 3.0,
        ..RiskParams::default()
    };
    let levels = StopLossTakeProfit::calculate_from_atr(Direction::Buy, 50.0, 1.0, &risk).unwrap();
    assert!((levels.target - 54.5).abs() < 1e-9);
    assert!((levels.stop_loss - 48.5).abs() < 1e-9);
}

#[test]
fn test_degenerate_inputs_are_rejected() {
    let risk = RiskParams::default();
    assert!(StopLossTakeProfit::calculate_from_atr(Direction::Buy, 100.0, 0.0, &risk).is_none());
    assert!(StopLossTakeProfit::calculate_from_atr(Direction::Buy, 100.0, f64::NAN, &risk).is_none());
    assert!(StopLossTakeProfit::calculate_from_percent(Direction::Buy, 0.0, &risk).is_none());
    // Stop would fall below zero
    assert!(StopLossTakeProfit::calculate_from_atr(Direction::Buy, 1.0, 10.0, &risk).is_none());
    // Target would fall below zero
    assert!(StopLossTakeProfit::calculate_from_atr(Direction::Short, 1.0, 0.5, &risk).is_none());
}
