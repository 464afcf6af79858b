//! Close escaping a linear regression channel on expanded volume

use crate::error::StrategyError;
use crate::indicators::structure::calculate_regression_channel;
use crate::indicators::volatility::calculate_atr;
use crate::models::signal::{Direction, RawSignal};
use crate::models::strategy::{ChannelBreakoutParams, RiskParams, StrategyId};
use crate::signals::decision::StopLossTakeProfit;
use crate::strategies::{trailing_mean, CandleWindow, Strategy};

const BASE_SCORE: f64 = 0.5;
const VOLUME_CAP: f64 = 0.2;
const PENETRATION_CAP: f64 = 0.2;
const FIT_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct ChannelBreakoutStrategy {
    params: ChannelBreakoutParams,
    risk: RiskParams,
}

impl ChannelBreakoutStrategy {
    pub fn new(params: ChannelBreakoutParams, risk: RiskParams) -> Self {
        Self { params, risk }
    }
}

impl Strategy for ChannelBreakoutStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::ChannelBreakout
    }

    /// The channel is fitted on history only, so one extra bar is needed
    fn min_candles(&self) -> usize {
        (self.params.lookback_period.max(2) + 1).max(self.risk.atr_period + 1)
    }

    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError> {
        if window.len() < self.min_candles() {
            return Ok(None);
        }
        window.ensure_finite()?;

        let p = &self.params;
        let n = window.len();
        let history = &window.candles[..n - 1];
        let Some(channel) = calculate_regression_channel(history, p.lookback_period) else {
            return Ok(None);
        };

        let fit = channel.fit_quality();
        let width = channel.width();
        if fit < p.min_r_squared || !width.is_finite() || width < p.min_channel_width {
            return Ok(None);
        }

        let volumes = window.volumes();
        let Some(average) = trailing_mean(&volumes, n - 1, p.lookback_period) else {
            return Ok(None);
        };
        if average <= 0.0 {
            return Ok(None);
        }
        let volume_ratio = volumes[n - 1] / average;
        if volume_ratio < p.volume_multiplier {
            return Ok(None);
        }

        let close = window.candles[n - 1].close;
        let prev_close = window.candles[n - 2].close;
        let (direction, penetration) = if close > channel.upper && prev_close <= channel.upper {
            (Direction::Buy, close - channel.upper)
        } else if close < channel.lower && prev_close >= channel.lower {
            (Direction::Short, channel.lower - close)
        } else {
            return Ok(None);
        };

        let channel_span = channel.upper - channel.lower;
        let penetration_part = (penetration / channel_span).clamp(0.0, 1.0) * PENETRATION_CAP;
        let volume_part =
            ((volume_ratio - p.volume_multiplier) / p.volume_multiplier * VOLUME_CAP).clamp(0.0, VOLUME_CAP);
        let score = BASE_SCORE + volume_part + penetration_part + FIT_WEIGHT * fit;

        let Some(atr) = calculate_atr(window.candles, self.risk.atr_period as u32) else {
            return Ok(None);
        };
        let Some(levels) = StopLossTakeProfit::calculate_from_atr(direction, close, atr.value, &self.risk)
        else {
            return Ok(None);
        };

        let (side, edge) = match direction {
            Direction::Buy => ("above", channel.upper),
            Direction::Short => ("below", channel.lower),
        };
        let reason = format!(
            "Close broke {} regression channel at {:.6} (R² {:.2}, width {:.1}%) on {:.1}x volume",
            side,
            edge,
            fit,
            width * 100.0,
            volume_ratio
        );

        Ok(window.signal(self.id(), direction, levels, score, reason))
    }
}
