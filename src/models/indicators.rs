use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Candle tables of one instrument keyed by timeframe label
pub type TimeframeData = BTreeMap<String, Vec<Candle>>;

/// One OHLCV bar. Windows handed to strategies are ascending by `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    /// Absolute body size relative to the bar's full range. A zero-range bar
    /// has ratio 0.
    pub fn body_ratio(&self) -> f64 {
        let range = self.high - self.low;
        if range <= 0.0 {
            return 0.0;
        }
        ((self.close - self.open).abs() / range).min(1.0)
    }
}

/// Stochastic RSI lines for the last two bars
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StochRsiIndicator {
    pub rsi: f64,
    pub k: f64,
    pub d: f64,
    pub prev_k: f64,
    pub prev_d: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub prev_macd: f64,
    pub prev_signal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<(u32, u32, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmaIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdxIndicator {
    pub value: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtrIndicator {
    pub value: f64,
    pub period: u32,
}

/// Local extremum at `index` of the analysed series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub value: f64,
}

/// Clustered horizontal level with the number of swings that formed it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub touches: usize,
}

/// Regression channel over highs and lows, projected one bar past the fitted
/// window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionChannel {
    pub upper: f64,
    pub lower: f64,
    pub upper_r_squared: f64,
    pub lower_r_squared: f64,
}

impl RegressionChannel {
    pub fn mid(&self) -> f64 {
        (self.upper + self.lower) / 2.0
    }

    /// Channel width relative to its midline
    pub fn width(&self) -> f64 {
        let mid = self.mid();
        if mid == 0.0 {
            return f64::NAN;
        }
        (self.upper - self.lower) / mid
    }

    /// Worse of the two fits
    pub fn fit_quality(&self) -> f64 {
        self.upper_r_squared.min(self.lower_r_squared)
    }
}
