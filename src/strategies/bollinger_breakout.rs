//! Bollinger band breakout, stronger after a volatility squeeze

use crate::error::StrategyError;
use crate::indicators::volatility::{bollinger_series, calculate_atr};
use crate::models::signal::{Direction, RawSignal};
use crate::models::strategy::{BollingerParams, RiskParams, StrategyId};
use crate::signals::decision::StopLossTakeProfit;
use crate::strategies::{CandleWindow, Strategy};

const BASE_SCORE: f64 = 0.5;
const SQUEEZE_BONUS: f64 = 0.2;
const PENETRATION_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct BollingerBreakoutStrategy {
    params: BollingerParams,
    risk: RiskParams,
}

impl BollingerBreakoutStrategy {
    pub fn new(params: BollingerParams, risk: RiskParams) -> Self {
        Self { params, risk }
    }
}

impl Strategy for BollingerBreakoutStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::BollingerBreakout
    }

    fn min_candles(&self) -> usize {
        let p = &self.params;
        (p.period.max(1) + p.squeeze_lookback + p.confirm_bars).max(self.risk.atr_period + 1)
    }

    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError> {
        if window.len() < self.min_candles() || self.params.confirm_bars == 0 {
            return Ok(None);
        }
        window.ensure_finite()?;

        let p = &self.params;
        let closes = window.closes();
        let bands = bollinger_series(&closes, p.period, p.std_dev);
        let n = closes.len();
        let run_start = n - p.confirm_bars;
        let before = run_start - 1;

        // The run must be a fresh exit: every bar of it outside, the bar before inside
        let direction = if (run_start..n).all(|i| closes[i] > bands.upper[i])
            && closes[before] <= bands.upper[before]
        {
            Direction::Buy
        } else if (run_start..n).all(|i| closes[i] < bands.lower[i])
            && closes[before] >= bands.lower[before]
        {
            Direction::Short
        } else {
            return Ok(None);
        };

        let squeeze_from = run_start.saturating_sub(p.squeeze_lookback);
        let min_bandwidth = (squeeze_from..run_start)
            .map(|i| bands.bandwidth(i))
            .filter(|b| b.is_finite())
            .fold(f64::INFINITY, f64::min);
        let squeezed = min_bandwidth < p.squeeze_threshold;

        let last = n - 1;
        let half_width = bands.upper[last] - bands.middle[last];
        let penetration = match direction {
            Direction::Buy => closes[last] - bands.upper[last],
            Direction::Short => bands.lower[last] - closes[last],
        };
        if half_width.is_nan() || half_width <= 0.0 {
            return Ok(None);
        }
        let depth = (penetration / half_width).clamp(0.0, 1.0);

        let mut score = BASE_SCORE + PENETRATION_WEIGHT * depth;
        if squeezed {
            score += SQUEEZE_BONUS;
        }

        let Some(atr) = calculate_atr(window.candles, self.risk.atr_period as u32) else {
            return Ok(None);
        };
        let Some(levels) =
            StopLossTakeProfit::calculate_from_atr(direction, closes[last], atr.value, &self.risk)
        else {
            return Ok(None);
        };

        let band = match direction {
            Direction::Buy => "upper",
            Direction::Short => "lower",
        };
        let mut reason = format!(
            "Close outside {} Bollinger band for {} bars ({:.1}% of half-width)",
            band,
            p.confirm_bars,
            depth * 100.0
        );
        if squeezed {
            reason.push_str(&format!(", after squeeze (bandwidth {:.4})", min_bandwidth));
        }

        Ok(window.signal(self.id(), direction, levels, score, reason))
    }
}
