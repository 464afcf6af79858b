//! Target and stop sizing for a triggered detector

use crate::common::math;
use crate::models::signal::Direction;
use crate::models::strategy::RiskParams;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeLevels {
    pub target: f64,
    pub stop_loss: f64,
}

pub struct StopLossTakeProfit;

impl StopLossTakeProfit {
    /// Stop distance = ATR × multiplier, target distance = stop distance × R:R
    pub fn calculate_from_atr(
        direction: Direction,
        price: f64,
        atr: f64,
        risk: &RiskParams,
    ) -> Option<TradeLevels> {
        Self::from_stop_distance(direction, price, atr * risk.atr_multiplier, risk.risk_reward_ratio)
    }

    /// Stop distance = price × stop percent, target distance = stop distance × R:R
    pub fn calculate_from_percent(
        direction: Direction,
        price: f64,
        risk: &RiskParams,
    ) -> Option<TradeLevels> {
        let distance = price * risk.stop_loss_percent / 100.0;
        Self::from_stop_distance(direction, price, distance, risk.risk_reward_ratio)
    }

    /// Rejects degenerate distances and levels that would cross zero
    fn from_stop_distance(
        direction: Direction,
        price: f64,
        stop_distance: f64,
        risk_reward_ratio: f64,
    ) -> Option<TradeLevels> {
        let stop_distance = math::finite(stop_distance)?;
        if stop_distance <= 0.0 || price <= 0.0 || risk_reward_ratio <= 0.0 {
            return None;
        }
        let target_distance = stop_distance * risk_reward_ratio;

        let levels = match direction {
            Direction::Buy => TradeLevels {
                target: price + target_distance,
                stop_loss: price - stop_distance,
            },
            Direction::Short => TradeLevels {
                target: price - target_distance,
                stop_loss: price + stop_distance,
            },
        };

        if levels.target <= 0.0 || levels.stop_loss <= 0.0 {
            return None;
        }
        Some(levels)
    }
}
