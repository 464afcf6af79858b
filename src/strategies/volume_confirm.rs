//! Volume spike on a decisive candle at the edge of the recent range.
//! A green candle near the bottom reads as BUY, a red one near the top as SHORT.

use crate::common::math;
use crate::error::StrategyError;
use crate::indicators::volatility::calculate_atr;
use crate::models::signal::{Direction, RawSignal};
use crate::models::strategy::{RiskParams, StrategyId, VolumeConfirmParams};
use crate::signals::decision::StopLossTakeProfit;
use crate::strategies::{trailing_mean, CandleWindow, Strategy};

const BASE_SCORE: f64 = 0.55;
/// Volume part is ratio / 10, capped
const VOLUME_CAP: f64 = 0.25;
const EXTREMITY_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct VolumeConfirmStrategy {
    params: VolumeConfirmParams,
    risk: RiskParams,
}

impl VolumeConfirmStrategy {
    pub fn new(params: VolumeConfirmParams, risk: RiskParams) -> Self {
        Self { params, risk }
    }

    /// Volume part grows with the spike ratio, the extremity part with how
    /// far the close sits past its percentile gate. Rounded to cents.
    fn score(&self, direction: Direction, volume_ratio: f64, rank: f64) -> f64 {
        let p = &self.params;
        let extremity = match direction {
            Direction::Buy => p.bottom_percentile - rank,
            Direction::Short => rank - p.top_percentile,
        };
        let score = BASE_SCORE + (volume_ratio / 10.0).min(VOLUME_CAP) + extremity * EXTREMITY_WEIGHT;
        math::round_to(score.min(1.0), 2)
    }
}

impl Strategy for VolumeConfirmStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::VolumeConfirm
    }

    fn min_candles(&self) -> usize {
        let p = &self.params;
        (p.volume_period.max(p.percentile_window).max(1) + 5).max(self.risk.atr_period + 1)
    }

    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError> {
        if window.len() < self.min_candles() {
            return Ok(None);
        }
        window.ensure_finite()?;

        let p = &self.params;
        let n = window.len();
        let last = &window.candles[n - 1];

        let volumes = window.volumes();
        let Some(average) = trailing_mean(&volumes, n, p.volume_period) else {
            return Ok(None);
        };
        if average <= 0.0 {
            return Ok(None);
        }
        let volume_ratio = last.volume / average;
        if volume_ratio < p.spike_multiplier {
            return Ok(None);
        }

        // Doji
        if last.body_ratio() < p.min_body_ratio || last.open <= 0.0 {
            return Ok(None);
        }
        let change = (last.close - last.open) / last.open;

        let closes = window.closes();
        let recent = &closes[n - p.percentile_window..];
        let Some(rank) = math::percentile_rank(recent, last.close) else {
            return Ok(None);
        };

        // The candle itself must point the same way as its place in the range
        let direction = if change >= p.min_move && rank <= p.bottom_percentile {
            Direction::Buy
        } else if -change >= p.min_move && rank >= p.top_percentile {
            Direction::Short
        } else {
            return Ok(None);
        };

        let Some(atr) = calculate_atr(window.candles, self.risk.atr_period as u32) else {
            return Ok(None);
        };
        let Some(levels) =
            StopLossTakeProfit::calculate_from_atr(direction, last.close, atr.value, &self.risk)
        else {
            return Ok(None);
        };

        let (candle, edge) = match direction {
            Direction::Buy => ("green", "bottom"),
            Direction::Short => ("red", "top"),
        };
        let reason = format!(
            "Volume spike {:.1}x average on a {} candle ({:+.2}%), close near {} of range (percentile {:.0})",
            volume_ratio,
            candle,
            change * 100.0,
            edge,
            rank * 100.0
        );

        Ok(window.signal(
            self.id(),
            direction,
            levels,
            self.score(direction, volume_ratio, rank),
            reason,
        ))
    }
}
