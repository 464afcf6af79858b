//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::models::indicators::{Candle, MacdIndicator};

/// MACD and signal lines aligned with the input closes
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// MACD = EMA(fast) - EMA(slow), Signal = EMA(signal) of MACD.
/// MACD is defined from index `slow - 1`, the signal line from
/// `slow + signal - 2`.
pub fn macd_series(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSeries {
    let fast = math::ema_series(closes, fast_period);
    let slow = math::ema_series(closes, slow_period);
    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = math::ema_series(&macd, signal_period);
    MacdSeries { macd, signal }
}

/// Calculate MACD for the last candle, with the previous bar's lines for
/// crossover detection
pub fn calculate_macd(
    candles: &[Candle],
    fast_period: u32,
    slow_period: u32,
    signal_period: u32,
) -> Option<MacdIndicator> {
    if candles.len() < (slow_period + signal_period) as usize {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let series = macd_series(
        &closes,
        fast_period as usize,
        slow_period as usize,
        signal_period as usize,
    );
    let last = closes.len() - 1;
    let macd = math::finite(series.macd[last])?;
    let signal = math::finite(series.signal[last])?;

    Some(MacdIndicator {
        macd,
        signal,
        histogram: macd - signal,
        prev_macd: math::finite(series.macd[last - 1])?,
        prev_signal: math::finite(series.signal[last - 1])?,
        period: Some((fast_period, slow_period, signal_period)),
    })
}
