//! ATR (Average True Range) indicator

use crate::common::math;
use crate::models::indicators::{AtrIndicator, Candle};

/// ATR series: exponential mean of the true range with span `period`
/// (alpha = 2 / (period + 1)), seeded with the first bar's high - low.
/// Values before index `period` are warm-up and left as NaN.
pub fn atr_series(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    let tr_values: Vec<f64> = candles
        .iter()
        .enumerate()
        .map(|(i, c)| match i {
            0 => c.high - c.low,
            _ => math::true_range(c.high, c.low, candles[i - 1].close),
        })
        .collect();
    let smoothed = math::ewm_series(&tr_values, 2.0 / (period as f64 + 1.0));
    result[period..].copy_from_slice(&smoothed[period..]);
    result
}

/// Calculate ATR (Average True Range)
///
/// ATR measures market volatility by averaging true range over a period
pub fn calculate_atr(candles: &[Candle], period: u32) -> Option<AtrIndicator> {
    if candles.len() < period as usize + 1 {
        return None;
    }

    let atr_value = math::finite(*atr_series(candles, period as usize).last()?)?;

    Some(AtrIndicator {
        value: atr_value,
        period,
    })
}
