//! Support and Resistance levels detection

use crate::indicators::structure::swing::{find_swing_highs, find_swing_lows};
use crate::models::indicators::{Candle, PriceLevel};

/// Horizontal levels found in a lookback window, ascending by price
#[derive(Debug, Clone, Default)]
pub struct SupportResistanceLevels {
    pub support: Vec<PriceLevel>,
    pub resistance: Vec<PriceLevel>,
}

/// Group prices whose distance to the running cluster mean is within
/// `tolerance` (relative). Output is ascending by price.
pub fn cluster_levels(prices: &[f64], tolerance: f64) -> Vec<PriceLevel> {
    let mut sorted: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut levels: Vec<PriceLevel> = Vec::new();
    let mut sum = 0.0;
    for price in sorted {
        if let Some(current) = levels.last_mut() {
            let mean = current.price;
            if mean != 0.0 && ((price - mean) / mean).abs() <= tolerance {
                sum += price;
                current.touches += 1;
                current.price = sum / current.touches as f64;
                continue;
            }
        }
        sum = price;
        levels.push(PriceLevel {
            price,
            touches: 1,
        });
    }
    levels
}

/// Calculate support and resistance levels
///
/// Swing lows of the last `lookback` candles cluster into support, swing
/// highs into resistance. Levels with fewer than `min_touches` swings are
/// dropped.
pub fn calculate_support_resistance(
    candles: &[Candle],
    lookback: usize,
    swing_window: usize,
    tolerance: f64,
    min_touches: usize,
) -> Option<SupportResistanceLevels> {
    if lookback == 0 || candles.len() < lookback {
        return None;
    }

    let recent = &candles[candles.len() - lookback..];
    let lows: Vec<f64> = recent.iter().map(|c| c.low).collect();
    let highs: Vec<f64> = recent.iter().map(|c| c.high).collect();

    let swing_lows: Vec<f64> = find_swing_lows(&lows, swing_window)
        .into_iter()
        .map(|p| p.value)
        .collect();
    let swing_highs: Vec<f64> = find_swing_highs(&highs, swing_window)
        .into_iter()
        .map(|p| p.value)
        .collect();

    let keep = |levels: Vec<PriceLevel>| -> Vec<PriceLevel> {
        levels
            .into_iter()
            .filter(|l| l.touches >= min_touches)
            .collect()
    };

    Some(SupportResistanceLevels {
        support: keep(cluster_levels(&swing_lows, tolerance)),
        resistance: keep(cluster_levels(&swing_highs, tolerance)),
    })
}
