//! Stochastic RSI: the stochastic transform applied to the RSI series

use crate::common::math;
use crate::indicators::momentum::rsi::rsi_series;
use crate::models::indicators::{Candle, StochRsiIndicator};

/// %K and %D lines aligned with the input closes
#[derive(Debug, Clone)]
pub struct StochRsiSeries {
    pub rsi: Vec<f64>,
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

/// raw = (RSI - min RSI) / (max RSI - min RSI) × 100 over `stoch_period`,
/// %K = SMA(raw, k_smoothing), %D = SMA(%K, d_smoothing).
/// A flat RSI window reads as 50.
pub fn stoch_rsi_series(
    closes: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    k_smoothing: usize,
    d_smoothing: usize,
) -> StochRsiSeries {
    let rsi = rsi_series(closes, rsi_period);
    let n = rsi.len();
    let mut raw = vec![f64::NAN; n];

    if stoch_period > 0 {
        for i in 0..n {
            if i + 1 < stoch_period {
                continue;
            }
            let window = &rsi[i + 1 - stoch_period..=i];
            if window.iter().any(|v| !v.is_finite()) {
                continue;
            }
            let lo = window.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            raw[i] = if hi - lo > 0.0 {
                (rsi[i] - lo) / (hi - lo) * 100.0
            } else {
                50.0
            };
        }
    }

    let k = smooth(&raw, k_smoothing);
    let d = smooth(&k, d_smoothing);
    StochRsiSeries { rsi, k, d }
}

/// SMA that tolerates a NaN prefix
fn smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    let Some(start) = values.iter().position(|v| v.is_finite()) else {
        return out;
    };
    let tail = math::sma_series(&values[start..], period);
    out[start..].copy_from_slice(&tail);
    out
}

/// Stochastic RSI lines for the last two candles
pub fn calculate_stoch_rsi(
    candles: &[Candle],
    rsi_period: usize,
    stoch_period: usize,
    k_smoothing: usize,
    d_smoothing: usize,
) -> Option<StochRsiIndicator> {
    if candles.len() < 2 {
        return None;
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let series = stoch_rsi_series(&closes, rsi_period, stoch_period, k_smoothing, d_smoothing);
    let last = closes.len() - 1;

    Some(StochRsiIndicator {
        rsi: math::finite(series.rsi[last])?,
        k: math::finite(series.k[last])?,
        d: math::finite(series.d[last])?,
        prev_k: math::finite(series.k[last - 1])?,
        prev_d: math::finite(series.d[last - 1])?,
    })
}
