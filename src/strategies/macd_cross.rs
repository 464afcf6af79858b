//! MACD line crossing its signal line

use crate::common::math;
use crate::error::StrategyError;
use crate::indicators::momentum::calculate_macd;
use crate::indicators::volatility::calculate_atr;
use crate::models::signal::{Direction, RawSignal};
use crate::models::strategy::{MacdCrossParams, RiskParams, StrategyId};
use crate::signals::decision::StopLossTakeProfit;
use crate::strategies::{CandleWindow, Strategy};

const BASE_SCORE: f64 = 0.45;
/// Bullish cross below zero or bearish cross above zero
const ZERO_SIDE_BONUS: f64 = 0.15;
const HISTOGRAM_WEIGHT: f64 = 0.4;
const HISTOGRAM_CAP: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct MacdCrossStrategy {
    params: MacdCrossParams,
    risk: RiskParams,
}

impl MacdCrossStrategy {
    pub fn new(params: MacdCrossParams, risk: RiskParams) -> Self {
        Self { params, risk }
    }
}

impl Strategy for MacdCrossStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::MacdCross
    }

    fn min_candles(&self) -> usize {
        let p = &self.params;
        (p.slow_period.max(p.fast_period) + p.signal_period)
            .max(2)
            .max(self.risk.atr_period + 1)
    }

    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError> {
        if window.len() < self.min_candles() {
            return Ok(None);
        }
        window.ensure_finite()?;

        let p = &self.params;
        let Some(macd) = calculate_macd(
            window.candles,
            p.fast_period as u32,
            p.slow_period as u32,
            p.signal_period as u32,
        ) else {
            return Ok(None);
        };

        let direction = if math::crossed_above(macd.prev_macd, macd.prev_signal, macd.macd, macd.signal) {
            Direction::Buy
        } else if math::crossed_below(macd.prev_macd, macd.prev_signal, macd.macd, macd.signal) {
            Direction::Short
        } else {
            return Ok(None);
        };

        let price = window.candles[window.len() - 1].close;
        // Lines that coincide up to rounding are not a cross
        if macd.histogram.abs() <= price.abs() * 1e-9 {
            return Ok(None);
        }

        let Some(atr) = calculate_atr(window.candles, self.risk.atr_period as u32) else {
            return Ok(None);
        };

        let far_side = match direction {
            Direction::Buy => macd.macd < 0.0,
            Direction::Short => macd.macd > 0.0,
        };
        let histogram_part = if atr.value > 0.0 {
            (macd.histogram.abs() / atr.value * HISTOGRAM_WEIGHT).min(HISTOGRAM_CAP)
        } else {
            0.0
        };
        let score = BASE_SCORE + if far_side { ZERO_SIDE_BONUS } else { 0.0 } + histogram_part;

        let Some(levels) = StopLossTakeProfit::calculate_from_atr(direction, price, atr.value, &self.risk)
        else {
            return Ok(None);
        };

        let verb = match direction {
            Direction::Buy => "above",
            Direction::Short => "below",
        };
        let zone = if macd.macd < 0.0 { "below" } else { "above" };
        let reason = format!(
            "MACD crossed {} signal {} zero (MACD {:.6}, signal {:.6}, histogram {:.6})",
            verb, zone, macd.macd, macd.signal, macd.histogram
        );

        Ok(window.signal(self.id(), direction, levels, score, reason))
    }
}
