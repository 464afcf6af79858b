//! Swing high/low detection
//!
//! A point at index `i` is a swing low iff it equals the minimum of the closed
//! window `[i - w, i + w]` (swing high: maximum). Points closer than `w` to
//! either end of the series cannot be confirmed and are never reported.

use crate::models::indicators::SwingPoint;

pub fn find_swing_lows(values: &[f64], window: usize) -> Vec<SwingPoint> {
    find_swings(values, window, |candidate, other| other < candidate)
}

pub fn find_swing_highs(values: &[f64], window: usize) -> Vec<SwingPoint> {
    find_swings(values, window, |candidate, other| other > candidate)
}

/// `beats(candidate, other)` is true when `other` disqualifies `candidate`
fn find_swings(values: &[f64], window: usize, beats: impl Fn(f64, f64) -> bool) -> Vec<SwingPoint> {
    let n = values.len();
    if n < 2 * window + 1 {
        return Vec::new();
    }

    (window..n - window)
        .filter_map(|i| {
            let candidate = values[i];
            let neighbourhood = &values[i - window..=i + window];
            if neighbourhood.iter().any(|v| !v.is_finite()) {
                return None;
            }
            if neighbourhood.iter().any(|&other| beats(candidate, other)) {
                return None;
            }
            Some(SwingPoint {
                index: i,
                value: candidate,
            })
        })
        .collect()
}
