//! RSI (Relative Strength Index) indicator

use crate::common::math;

/// RSI series with Wilder smoothing (alpha = 1/period) of gains and losses,
/// each seeded with the first price change.
///
/// RSI = 100 - (100 / (1 + RS)), RS = Average Gain / Average Loss.
/// The first value sits at index `period`. No movement at all reads as 50.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    let mut gains = vec![f64::NAN; n];
    let mut losses = vec![f64::NAN; n];
    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        if change.is_nan() {
            continue;
        }
        gains[i] = change.max(0.0);
        losses[i] = (-change).max(0.0);
    }

    let alpha = 1.0 / period as f64;
    let avg_gain = math::ewm_series(&gains, alpha);
    let avg_loss = math::ewm_series(&losses, alpha);
    for i in period..n {
        result[i] = rsi_from_averages(avg_gain[i], avg_loss[i]);
    }
    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_gain == 0.0 && avg_loss == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
