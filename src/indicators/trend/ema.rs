//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::indicators::{Candle, EmaIndicator};

/// Fast/slow EMA crossover on the last bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmaCross {
    /// Fast EMA crossed above the slow EMA (golden cross)
    Golden,
    /// Fast EMA crossed below the slow EMA (death cross)
    Death,
    None,
}

/// Calculate EMA for a specific period
pub fn calculate_ema(candles: &[Candle], period: u32) -> Option<EmaIndicator> {
    if candles.len() < period as usize {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema_value = math::ema(&closes, period as usize)?;

    Some(EmaIndicator {
        value: ema_value,
        period,
    })
}

/// Calculate multiple EMAs at once
pub fn calculate_emas(candles: &[Candle], periods: &[u32]) -> Vec<EmaIndicator> {
    periods
        .iter()
        .filter_map(|&period| calculate_ema(candles, period))
        .collect()
}

/// Check whether the fast EMA crossed the slow EMA on the last candle.
/// Needs `slow_period + 1` candles so both lines exist on the previous bar.
pub fn check_ema_cross(candles: &[Candle], fast_period: u32, slow_period: u32) -> Option<EmaCross> {
    if candles.len() < slow_period as usize + 1 || candles.len() < fast_period as usize + 1 {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let fast = math::ema_series(&closes, fast_period as usize);
    let slow = math::ema_series(&closes, slow_period as usize);
    let last = closes.len() - 1;

    let (prev_fast, prev_slow) = (math::finite(fast[last - 1])?, math::finite(slow[last - 1])?);
    let (fast_now, slow_now) = (math::finite(fast[last])?, math::finite(slow[last])?);

    if math::crossed_above(prev_fast, prev_slow, fast_now, slow_now) {
        Some(EmaCross::Golden)
    } else if math::crossed_below(prev_fast, prev_slow, fast_now, slow_now) {
        Some(EmaCross::Death)
    } else {
        Some(EmaCross::None)
    }
}
