//! Linear regression channel over highs and lows

use crate::common::math;
use crate::models::indicators::{Candle, RegressionChannel};

/// Fit one regression line through the highs and one through the lows of the
/// last `lookback` candles, and project both one bar past the window.
pub fn calculate_regression_channel(candles: &[Candle], lookback: usize) -> Option<RegressionChannel> {
    if lookback < 2 || candles.len() < lookback {
        return None;
    }

    let window = &candles[candles.len() - lookback..];
    let highs: Vec<f64> = window.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = window.iter().map(|c| c.low).collect();

    let upper_fit = math::linear_regression(&highs)?;
    let lower_fit = math::linear_regression(&lows)?;
    let x = lookback as f64;

    Some(RegressionChannel {
        upper: math::finite(upper_fit.at(x))?,
        lower: math::finite(lower_fit.at(x))?,
        upper_r_squared: upper_fit.r_squared,
        lower_r_squared: lower_fit.r_squared,
    })
}
