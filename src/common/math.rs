//! Numeric helpers shared by indicators and strategies.
//!
//! Series helpers return a vector aligned with their input; positions without
//! enough history hold `f64::NAN`. Scalar helpers return `None` when the input
//! is too short or the result is not finite.

/// Rolling simple moving average aligned with `values`
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }
    for i in (period - 1)..n {
        let sum: f64 = values[i + 1 - period..=i].iter().sum();
        out[i] = sum / period as f64;
    }
    out
}

/// Exponential moving average of the whole slice, seeded with the SMA of the
/// first `period` values
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    let series = ema_series(values, period);
    series.last().copied().and_then(finite)
}

/// EMA step from the previous EMA value
pub fn ema_from_previous(value: f64, previous: f64, period: usize) -> f64 {
    let k = 2.0 / (period as f64 + 1.0);
    value * k + previous * (1.0 - k)
}

/// Exponential moving average series. The first defined value sits at index
/// `period - 1` (SMA seed). Leading NaNs in the input shift the seed forward.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 {
        return out;
    }
    let Some(start) = values.iter().position(|v| v.is_finite()) else {
        return out;
    };
    if n - start < period {
        return out;
    }

    let seed_end = start + period - 1;
    let seed: f64 = values[start..=seed_end].iter().sum::<f64>() / period as f64;
    out[seed_end] = seed;
    let mut prev = seed;
    for i in (seed_end + 1)..n {
        prev = ema_from_previous(values[i], prev, period);
        out[i] = prev;
    }
    out
}

/// Wilder smoothing (alpha = 1/period), seeded with the SMA of the first
/// `period` finite values.
pub fn wilder_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 {
        return out;
    }
    let Some(start) = values.iter().position(|v| v.is_finite()) else {
        return out;
    };
    if n - start < period {
        return out;
    }

    let seed_end = start + period - 1;
    let mut prev: f64 = values[start..=seed_end].iter().sum::<f64>() / period as f64;
    out[seed_end] = prev;
    let alpha = 1.0 / period as f64;
    for i in (seed_end + 1)..n {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        out[i] = prev;
    }
    out
}

/// Exponentially weighted mean with the `adjust = false` recursion
/// `out[i] = alpha * x[i] + (1 - alpha) * out[i - 1]`, seeded with the first
/// finite value. A non-finite value carries the previous mean forward.
pub fn ewm_series(values: &[f64], alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    let Some(start) = values.iter().position(|v| v.is_finite()) else {
        return out;
    };

    let mut prev = values[start];
    out[start] = prev;
    for i in (start + 1)..n {
        if values[i].is_finite() {
            prev = alpha * values[i] + (1.0 - alpha) * prev;
        }
        out[i] = prev;
    }
    out
}

/// Rolling population standard deviation aligned with `values`
pub fn std_dev_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        out[i] = variance.sqrt();
    }
    out
}

/// True range of a bar given the previous close
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Least-squares line through `(i, values[i])`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    /// Value of the fitted line at `x`
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares fit over the sample index. A perfectly flat input
/// is a perfect fit (R² = 1).
pub fn linear_regression(values: &[f64]) -> Option<LinearFit> {
    let n = values.len();
    if n < 2 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, y) in values.iter().enumerate() {
        let fitted = intercept + slope * i as f64;
        ss_res += (y - fitted).powi(2);
        ss_tot += (y - mean_y).powi(2);
    }
    let r_squared = if ss_tot <= f64::EPSILON * nf {
        1.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }
    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

/// Fraction of `window` strictly below `value`, in [0, 1]
pub fn percentile_rank(window: &[f64], value: f64) -> Option<f64> {
    if window.is_empty() || !value.is_finite() {
        return None;
    }
    let below = window.iter().filter(|v| **v < value).count();
    Some(below as f64 / window.len() as f64)
}

/// `a` crossed from at-or-below `b` to strictly above it
pub fn crossed_above(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a <= prev_b && a > b
}

/// `a` crossed from at-or-above `b` to strictly below it
pub fn crossed_below(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a >= prev_b && a < b
}

/// Keep finite values only
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Round to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
