//! Break of a clustered support/resistance level on volume

use crate::error::StrategyError;
use crate::indicators::structure::calculate_support_resistance;
use crate::models::indicators::PriceLevel;
use crate::models::signal::{Direction, RawSignal};
use crate::models::strategy::{LevelBreakoutParams, RiskParams, StrategyId};
use crate::signals::decision::StopLossTakeProfit;
use crate::strategies::{trailing_mean, CandleWindow, Strategy};

const BASE_SCORE: f64 = 0.5;
const TOUCH_STEP: f64 = 0.1;
const TOUCH_CAP: f64 = 0.2;
const VOLUME_CAP: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct LevelBreakoutStrategy {
    params: LevelBreakoutParams,
    risk: RiskParams,
}

impl LevelBreakoutStrategy {
    pub fn new(params: LevelBreakoutParams, risk: RiskParams) -> Self {
        Self { params, risk }
    }

    /// Level crossed by the last bar and still within `proximity_threshold`
    /// of the close. Ties on touches go to the nearest level.
    fn crossed_level(
        &self,
        levels: &[PriceLevel],
        prev_close: f64,
        close: f64,
        direction: Direction,
    ) -> Option<PriceLevel> {
        levels
            .iter()
            .filter(|level| match direction {
                Direction::Buy => prev_close <= level.price && close > level.price,
                Direction::Short => prev_close >= level.price && close < level.price,
            })
            .filter(|level| (close - level.price).abs() / level.price <= self.params.proximity_threshold)
            .min_by(|a, b| {
                b.touches
                    .cmp(&a.touches)
                    .then_with(|| (close - a.price).abs().total_cmp(&(close - b.price).abs()))
            })
            .copied()
    }
}

impl Strategy for LevelBreakoutStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::LevelBreakout
    }

    /// Levels come from history only, so one extra bar is needed
    fn min_candles(&self) -> usize {
        let p = &self.params;
        (p.swing_lookback.max(2 * p.swing_window + 1) + 1).max(p.volume_period + 1)
    }

    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError> {
        if window.len() < self.min_candles() {
            return Ok(None);
        }
        window.ensure_finite()?;

        let p = &self.params;
        let n = window.len();
        let history = &window.candles[..n - 1];
        let Some(levels) = calculate_support_resistance(
            history,
            p.swing_lookback.min(history.len()),
            p.swing_window,
            p.cluster_tolerance,
            p.min_touches,
        ) else {
            return Ok(None);
        };

        let volumes = window.volumes();
        let Some(average) = trailing_mean(&volumes, n - 1, p.volume_period) else {
            return Ok(None);
        };
        if average <= 0.0 {
            return Ok(None);
        }
        let volume_ratio = volumes[n - 1] / average;
        if volume_ratio < p.breakout_volume_multiplier {
            return Ok(None);
        }

        let close = window.candles[n - 1].close;
        let prev_close = window.candles[n - 2].close;
        let (direction, level) =
            match self.crossed_level(&levels.resistance, prev_close, close, Direction::Buy) {
                Some(level) => (Direction::Buy, level),
                None => match self.crossed_level(&levels.support, prev_close, close, Direction::Short) {
                    Some(level) => (Direction::Short, level),
                    None => return Ok(None),
                },
            };

        let extra_touches = level.touches.saturating_sub(p.min_touches) + 1;
        let touch_part = (TOUCH_STEP * extra_touches as f64).min(TOUCH_CAP);
        let volume_part = ((volume_ratio - p.breakout_volume_multiplier) / p.breakout_volume_multiplier
            * VOLUME_CAP)
            .clamp(0.0, VOLUME_CAP);
        let score = BASE_SCORE + touch_part + volume_part;

        let Some(trade) = StopLossTakeProfit::calculate_from_percent(direction, close, &self.risk) else {
            return Ok(None);
        };

        let (verb, kind) = match direction {
            Direction::Buy => ("above", "resistance"),
            Direction::Short => ("below", "support"),
        };
        let reason = format!(
            "Close broke {} {} {:.6} ({} touches) on {:.1}x volume",
            verb, kind, level.price, level.touches, volume_ratio
        );

        Ok(window.signal(self.id(), direction, trade, score, reason))
    }
}
