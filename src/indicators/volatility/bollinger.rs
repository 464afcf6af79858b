//! Bollinger Bands indicator

use crate::common::math;

/// Band lines aligned with the input closes
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerSeries {
    /// (upper - lower) / middle at `index`
    pub fn bandwidth(&self, index: usize) -> f64 {
        let middle = self.middle[index];
        if middle == 0.0 {
            return f64::NAN;
        }
        (self.upper[index] - self.lower[index]) / middle
    }
}

/// Middle = SMA(period), Upper/Lower = Middle ± std_dev × σ(period)
pub fn bollinger_series(closes: &[f64], period: usize, std_dev: f64) -> BollingerSeries {
    let middle = math::sma_series(closes, period);
    let sigma = math::std_dev_series(closes, period);
    let upper = middle
        .iter()
        .zip(&sigma)
        .map(|(m, s)| m + std_dev * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&sigma)
        .map(|(m, s)| m - std_dev * s)
        .collect();
    BollingerSeries {
        upper,
        middle,
        lower,
    }
}
