//! Stochastic RSI crossover gated by RSI and %K oversold/overbought levels

use crate::common::math;
use crate::error::StrategyError;
use crate::indicators::momentum::calculate_stoch_rsi;
use crate::indicators::volatility::calculate_atr;
use crate::models::signal::{Direction, RawSignal};
use crate::models::strategy::{RiskParams, RsiStochParams, StrategyId};
use crate::signals::decision::StopLossTakeProfit;
use crate::strategies::{CandleWindow, Strategy};

const BASE_SCORE: f64 = 0.5;
const DEPTH_WEIGHT: f64 = 0.25;
const EXTREME_BONUS: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct RsiStochStrategy {
    params: RsiStochParams,
    risk: RiskParams,
}

impl RsiStochStrategy {
    pub fn new(params: RsiStochParams, risk: RiskParams) -> Self {
        Self { params, risk }
    }

    /// Base plus a quarter of the combined RSI and %K depth past their
    /// thresholds, with a bonus once RSI reaches the extreme level. Rounded
    /// to cents.
    fn score(&self, direction: Direction, rsi: f64, k: f64) -> f64 {
        let p = &self.params;
        let (rsi_depth, k_depth, extreme) = match direction {
            Direction::Buy => (
                (p.oversold - rsi) / p.oversold,
                (p.stoch_oversold - k) / p.stoch_oversold,
                rsi <= p.extreme_oversold,
            ),
            Direction::Short => (
                (rsi - p.overbought) / (100.0 - p.overbought),
                (k - p.stoch_overbought) / (100.0 - p.stoch_overbought),
                rsi >= p.extreme_overbought,
            ),
        };
        let mut score = BASE_SCORE + (rsi_depth.max(0.0) + k_depth.max(0.0)) * DEPTH_WEIGHT;
        if extreme {
            score += EXTREME_BONUS;
        }
        math::round_to(score.min(1.0), 2)
    }
}

impl Strategy for RsiStochStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::RsiStoch
    }

    fn min_candles(&self) -> usize {
        let p = &self.params;
        (p.rsi_period + p.stoch_period + p.k_smoothing + p.d_smoothing).max(self.risk.atr_period + 1)
    }

    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError> {
        if window.len() < self.min_candles() {
            return Ok(None);
        }
        window.ensure_finite()?;

        let p = &self.params;
        let Some(stoch) = calculate_stoch_rsi(
            window.candles,
            p.rsi_period,
            p.stoch_period,
            p.k_smoothing,
            p.d_smoothing,
        ) else {
            return Ok(None);
        };

        let direction = if math::crossed_above(stoch.prev_k, stoch.prev_d, stoch.k, stoch.d)
            && stoch.rsi <= p.oversold
            && stoch.k < p.stoch_oversold
        {
            Direction::Buy
        } else if math::crossed_below(stoch.prev_k, stoch.prev_d, stoch.k, stoch.d)
            && stoch.rsi >= p.overbought
            && stoch.k > p.stoch_overbought
        {
            Direction::Short
        } else {
            return Ok(None);
        };

        let Some(atr) = calculate_atr(window.candles, self.risk.atr_period as u32) else {
            return Ok(None);
        };
        let price = window.candles[window.len() - 1].close;
        let Some(levels) = StopLossTakeProfit::calculate_from_atr(direction, price, atr.value, &self.risk)
        else {
            return Ok(None);
        };

        let (verb, zone) = match direction {
            Direction::Buy => ("above", "oversold"),
            Direction::Short => ("below", "overbought"),
        };
        let reason = format!(
            "StochRSI %K crossed {} %D ({:.1}/{:.1}), RSI {} at {:.1}",
            verb, stoch.k, stoch.d, zone, stoch.rsi
        );

        Ok(window.signal(self.id(), direction, levels, self.score(direction, stoch.rsi, stoch.k), reason))
    }
}
