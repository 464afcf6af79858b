//! ADX (Average Directional Index) indicator
//!
//! Wilder's construction:
//! 1. +DM / -DM from consecutive highs and lows
//! 2. Wilder-smoothed TR, +DM, -DM
//! 3. +DI = 100 × smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 × |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! ADX is first defined at index `2 × period - 1`.

use crate::common::math;
use crate::models::indicators::{AdxIndicator, Candle};

#[derive(Debug, Clone)]
pub struct AdxSeries {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

pub fn adx_series(candles: &[Candle], period: usize) -> AdxSeries {
    let n = candles.len();
    let mut series = AdxSeries {
        adx: vec![f64::NAN; n],
        plus_di: vec![f64::NAN; n],
        minus_di: vec![f64::NAN; n],
    };
    if period == 0 || n < period + 1 {
        return series;
    }

    let mut tr_values = Vec::with_capacity(n - 1);
    let mut plus_dm_values = Vec::with_capacity(n - 1);
    let mut minus_dm_values = Vec::with_capacity(n - 1);
    for i in 1..n {
        tr_values.push(math::true_range(
            candles[i].high,
            candles[i].low,
            candles[i - 1].close,
        ));

        let up_move = candles[i].high - candles[i - 1].high;
        let down_move = candles[i - 1].low - candles[i].low;
        plus_dm_values.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dm_values.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });
    }

    let atr = math::wilder_series(&tr_values, period);
    let plus_dm = math::wilder_series(&plus_dm_values, period);
    let minus_dm = math::wilder_series(&minus_dm_values, period);

    // dx[j] belongs to candle j + 1
    let mut dx = vec![f64::NAN; n - 1];
    for j in 0..(n - 1) {
        if atr[j].is_nan() {
            continue;
        }
        let (plus_di, minus_di) = if atr[j] > 0.0 {
            (100.0 * plus_dm[j] / atr[j], 100.0 * minus_dm[j] / atr[j])
        } else {
            (0.0, 0.0)
        };
        series.plus_di[j + 1] = plus_di;
        series.minus_di[j + 1] = minus_di;

        let di_sum = plus_di + minus_di;
        dx[j] = if di_sum > 0.0 {
            100.0 * (plus_di - minus_di).abs() / di_sum
        } else {
            0.0
        };
    }

    let adx = math::wilder_series(&dx, period);
    for j in 0..(n - 1) {
        series.adx[j + 1] = adx[j];
    }
    series
}

/// Calculate ADX for the last candle
pub fn calculate_adx(candles: &[Candle], period: u32) -> Option<AdxIndicator> {
    if candles.len() < 2 * period as usize {
        return None;
    }
    let series = adx_series(candles, period as usize);
    let last = candles.len() - 1;

    Some(AdxIndicator {
        value: math::finite(series.adx[last])?,
        plus_di: math::finite(series.plus_di[last])?,
        minus_di: math::finite(series.minus_di[last])?,
        period,
    })
}
