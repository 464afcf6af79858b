//! Regular RSI divergence between the last two confirmed price swings

use crate::error::StrategyError;
use crate::indicators::momentum::rsi_series;
use crate::indicators::structure::{find_swing_highs, find_swing_lows};
use crate::indicators::volatility::calculate_atr;
use crate::models::indicators::SwingPoint;
use crate::models::signal::{Direction, RawSignal};
use crate::models::strategy::{RiskParams, RsiDivergenceParams, StrategyId};
use crate::signals::decision::StopLossTakeProfit;
use crate::strategies::{CandleWindow, Strategy};

const BASE_SCORE: f64 = 0.5;
const MOVE_WEIGHT: f64 = 2.5;
const MOVE_CAP: f64 = 0.25;
const RSI_GAP_CAP: f64 = 0.15;
const ZONE_BONUS: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct RsiDivergenceStrategy {
    params: RsiDivergenceParams,
    risk: RiskParams,
}

/// Two swings of the same kind, `first` older than `second`
#[derive(Debug, Clone, Copy)]
struct Divergence {
    direction: Direction,
    first: SwingPoint,
    second: SwingPoint,
    first_rsi: f64,
    second_rsi: f64,
    price_move: f64,
}

impl RsiDivergenceStrategy {
    pub fn new(params: RsiDivergenceParams, risk: RiskParams) -> Self {
        Self { params, risk }
    }

    /// Bullish: lower low in price, higher low in RSI.
    /// Bearish: higher high in price, lower high in RSI.
    fn detect(&self, closes: &[f64], rsi: &[f64], direction: Direction) -> Option<Divergence> {
        let p = &self.params;
        let start = closes.len() - p.divergence_lookback;
        let segment = &closes[start..];

        let swings = match direction {
            Direction::Buy => find_swing_lows(segment, p.swing_window),
            Direction::Short => find_swing_highs(segment, p.swing_window),
        };
        let [.., first, second] = swings.as_slice() else {
            return None;
        };
        let (first_rsi, second_rsi) = (rsi[start + first.index], rsi[start + second.index]);
        if !first_rsi.is_finite() || !second_rsi.is_finite() || first.value == 0.0 {
            return None;
        }

        let price_move = (second.value - first.value).abs() / first.value;
        let diverges = match direction {
            Direction::Buy => second.value < first.value && second_rsi > first_rsi,
            Direction::Short => second.value > first.value && second_rsi < first_rsi,
        };
        if !diverges || price_move < p.min_price_swing {
            return None;
        }

        Some(Divergence {
            direction,
            first: *first,
            second: *second,
            first_rsi,
            second_rsi,
            price_move,
        })
    }

    fn score(&self, d: &Divergence) -> f64 {
        let in_zone = match d.direction {
            Direction::Buy => d.second_rsi < self.params.rsi_oversold + 10.0,
            Direction::Short => d.second_rsi > self.params.rsi_overbought - 10.0,
        };
        BASE_SCORE
            + (d.price_move * MOVE_WEIGHT).min(MOVE_CAP)
            + ((d.second_rsi - d.first_rsi).abs() / 100.0).min(RSI_GAP_CAP)
            + if in_zone { ZONE_BONUS } else { 0.0 }
    }
}

impl Strategy for RsiDivergenceStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::RsiDivergence
    }

    fn min_candles(&self) -> usize {
        let p = &self.params;
        (p.rsi_period + p.divergence_lookback).max(self.risk.atr_period + 1)
    }

    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError> {
        if window.len() < self.min_candles() || self.params.divergence_lookback == 0 {
            return Ok(None);
        }
        window.ensure_finite()?;

        let closes = window.closes();
        let rsi = rsi_series(&closes, self.params.rsi_period);

        let Some(divergence) = self
            .detect(&closes, &rsi, Direction::Buy)
            .or_else(|| self.detect(&closes, &rsi, Direction::Short))
        else {
            return Ok(None);
        };

        let price = closes[closes.len() - 1];
        let Some(atr) = calculate_atr(window.candles, self.risk.atr_period as u32) else {
            return Ok(None);
        };
        let Some(levels) =
            StopLossTakeProfit::calculate_from_atr(divergence.direction, price, atr.value, &self.risk)
        else {
            return Ok(None);
        };

        let kind = match divergence.direction {
            Direction::Buy => "Bullish",
            Direction::Short => "Bearish",
        };
        let reason = format!(
            "{} RSI divergence: price {:.6} -> {:.6} ({:.1}%), RSI {:.1} -> {:.1}",
            kind,
            divergence.first.value,
            divergence.second.value,
            divergence.price_move * 100.0,
            divergence.first_rsi,
            divergence.second_rsi
        );

        Ok(window.signal(
            self.id(),
            divergence.direction,
            levels,
            self.score(&divergence),
            reason,
        ))
    }
}
