//! Shared candle and signal builders for unit tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use confluence::models::indicators::Candle;
use confluence::models::signal::{Direction, RawSignal};
use confluence::models::strategy::StrategyId;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Hourly candles opening at the previous close, with half a point of wick
/// on both sides of the body
pub fn create_test_candles(closes: &[f64]) -> Vec<Candle> {
    create_candles_with_volume(closes, &vec![1000.0; closes.len()])
}

pub fn create_candles_with_volume(closes: &[f64], volumes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i > 0 { closes[i - 1] } else { close };
            Candle::new(
                open,
                open.max(close) + 0.5,
                open.min(close) - 0.5,
                close,
                volumes[i],
                base_time() + Duration::hours(i as i64),
            )
        })
        .collect()
}

/// Candles where every price equals `price`
pub fn create_flat_candles(count: usize, price: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| Candle::new(price, price, price, price, 1000.0, base_time() + Duration::hours(i as i64)))
        .collect()
}

pub fn raw_signal(
    timeframe: &str,
    strategy: StrategyId,
    direction: Direction,
    price: f64,
    score: f64,
) -> RawSignal {
    let (target, stop_loss) = match direction {
        Direction::Buy => (price * 1.03, price * 0.985),
        Direction::Short => (price * 0.97, price * 1.015),
    };
    RawSignal {
        symbol: "BTC/USDT".to_string(),
        timeframe: timeframe.to_string(),
        strategy,
        direction,
        price,
        target,
        stop_loss,
        score,
        reason: format!("{} on {}", strategy, timeframe),
        timestamp: base_time(),
    }
}
