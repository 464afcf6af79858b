//! Unit tests for signal sinks and the performance store

use chrono::Duration;
use confluence::error::SinkError;
use confluence::models::signal::{CompositeSignal, Direction};
use confluence::models::strategy::StrategyId;
use confluence::services::{LogSink, MemorySignalStore, SignalSink};

use crate::test_utils::base_time;

fn composite(symbol: &str, direction: Direction, price: f64) -> CompositeSignal {
    let (target, stop_loss) = match direction {
        Direction::Buy => (price * 1.04, price * 0.98),
        Direction::Short => (price * 0.96, price * 1.02),
    };
    CompositeSignal {
        symbol: symbol.to_string(),
        direction,
        price,
        target,
        stop_loss,
        confluence: 2,
        average_confidence: 0.7,
        final_confidence: 0.8,
        timeframes: vec!["1h".to_string(), "4h".to_string()],
        strategies: vec![StrategyId::RsiStoch, StrategyId::MacdCross],
        reasons: vec!["first".to_string(), "second".to_string()],
        is_multi_timeframe: true,
        timestamp: base_time(),
    }
}

#[test]
fn test_summary_rendering() {
    let summary = composite("BTC/USDT", Direction::Buy, 100.0).summary();
    assert!(summary.contains("BUY | BTC/USDT | 1h+4h [MTF]"));
    assert!(summary.contains("(+4.00%)"));
    assert!(summary.contains("(-2.00%)"));
    assert!(summary.contains("Score  : 80%"));
    assert!(summary.contains("rsi_stoch, macd_cross"));
    assert!(summary.contains("    - second"));
}

#[tokio::test]
async fn test_log_sink_accepts_signals() {
    let sink = LogSink;
    assert_eq!(sink.name(), "log");
    assert!(sink.publish(&composite("BTC/USDT", Direction::Buy, 100.0)).await.is_ok());
}

#[tokio::test]
async fn test_store_assigns_ids() {
    let store = MemorySignalStore::new();
    assert_eq!(store.save(&composite("BTC/USDT", Direction::Buy, 100.0)).await, 1);
    assert_eq!(store.save(&composite("ETH/USDT", Direction::Short, 50.0)).await, 2);
    assert_eq!(store.get(2).await.unwrap().signal.symbol, "ETH/USDT");
    assert!(store.get(3).await.is_none());
}

#[tokio::test]
async fn test_outcomes_and_stats() {
    let store = MemorySignalStore::new();
    let long = store.save(&composite("BTC/USDT", Direction::Buy, 100.0)).await;
    let short = store.save(&composite("ETH/USDT", Direction::Short, 50.0)).await;
    let losing = store.save(&composite("SOL/USDT", Direction::Buy, 20.0)).await;
    store.save(&composite("XRP/USDT", Direction::Buy, 1.0)).await;

    let closed_at = base_time() + Duration::hours(6);
    let pnl = store.record_outcome(long, 104.0, true, closed_at).await.unwrap();
    assert!((pnl - 4.0).abs() < 1e-9);
    let pnl = store.record_outcome(short, 48.0, true, closed_at).await.unwrap();
    assert!((pnl - 4.0).abs() < 1e-9);
    let pnl = store.record_outcome(losing, 19.6, false, closed_at).await.unwrap();
    assert!((pnl + 2.0).abs() < 1e-9);

    let stats = store.stats().await;
    assert_eq!(stats.total_signals, 4);
    assert_eq!(stats.closed_signals, 3);
    assert_eq!(stats.open_signals, 1);
    assert_eq!(stats.total_wins, 2);
    assert_eq!(stats.total_losses, 1);
    assert_eq!(stats.win_rate, 66.67);
    assert_eq!(stats.avg_profit, 4.0);
    assert_eq!(stats.avg_loss, -2.0);
    assert_eq!(store.open_signals().await.len(), 1);
}

#[tokio::test]
async fn test_unknown_outcome_id() {
    let store = MemorySignalStore::new();
    let result = store.record_outcome(7, 1.0, true, base_time()).await;
    assert!(matches!(result, Err(SinkError::UnknownSignal(7))));
}

#[tokio::test]
async fn test_store_as_sink() {
    let store = MemorySignalStore::new();
    let sink: &dyn SignalSink = &store;
    assert_eq!(sink.name(), "memory_store");
    sink.publish(&composite("BTC/USDT", Direction::Buy, 100.0)).await.unwrap();
    assert_eq!(store.signals().await.len(), 1);
    let stats = store.stats().await;
    assert_eq!(stats.total_signals, 1);
    assert_eq!(stats.open_signals, 1);
    assert_eq!(stats.win_rate, 0.0);
}
