//! Golden/death cross of two EMAs, filtered by trend strength

use crate::error::StrategyError;
use crate::indicators::trend::{calculate_adx, check_ema_cross, EmaCross};
use crate::indicators::volatility::calculate_atr;
use crate::models::signal::{Direction, RawSignal};
use crate::models::strategy::{EmaCrossParams, RiskParams, StrategyId};
use crate::signals::decision::StopLossTakeProfit;
use crate::strategies::{CandleWindow, Strategy};

const BASE_SCORE: f64 = 0.55;
const ADX_CAP: f64 = 0.25;
const DI_BONUS: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct EmaCrossStrategy {
    params: EmaCrossParams,
    risk: RiskParams,
}

impl EmaCrossStrategy {
    pub fn new(params: EmaCrossParams, risk: RiskParams) -> Self {
        Self { params, risk }
    }
}

impl Strategy for EmaCrossStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::EmaCross
    }

    fn min_candles(&self) -> usize {
        let p = &self.params;
        (p.slow_period + 1)
            .max(p.fast_period + 1)
            .max(2 * p.adx_period.max(1))
            .max(self.risk.atr_period + 1)
    }

    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError> {
        if window.len() < self.min_candles() {
            return Ok(None);
        }
        window.ensure_finite()?;

        let p = &self.params;
        let direction = match check_ema_cross(window.candles, p.fast_period as u32, p.slow_period as u32) {
            Some(EmaCross::Golden) => Direction::Buy,
            Some(EmaCross::Death) => Direction::Short,
            Some(EmaCross::None) | None => return Ok(None),
        };

        let Some(adx) = calculate_adx(window.candles, p.adx_period as u32) else {
            return Ok(None);
        };
        if adx.value < p.min_adx {
            return Ok(None);
        }

        let di_agrees = match direction {
            Direction::Buy => adx.plus_di > adx.minus_di,
            Direction::Short => adx.minus_di > adx.plus_di,
        };
        let score = BASE_SCORE
            + ((adx.value - p.min_adx) / 100.0).min(ADX_CAP)
            + if di_agrees { DI_BONUS } else { 0.0 };

        let Some(atr) = calculate_atr(window.candles, self.risk.atr_period as u32) else {
            return Ok(None);
        };
        let price = window.candles[window.len() - 1].close;
        let Some(levels) = StopLossTakeProfit::calculate_from_atr(direction, price, atr.value, &self.risk)
        else {
            return Ok(None);
        };

        let cross = match direction {
            Direction::Buy => "Golden",
            Direction::Short => "Death",
        };
        let reason = format!(
            "{} cross EMA{}/EMA{} with ADX {:.1} (+DI {:.1}, -DI {:.1})",
            cross, p.fast_period, p.slow_period, adx.value, adx.plus_di, adx.minus_di
        );

        Ok(window.signal(self.id(), direction, levels, score, reason))
    }
}
