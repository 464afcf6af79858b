//! Real detectors over candle files through full cycles

use chrono::Duration;
use confluence::config::EngineConfig;
use confluence::core::clock::ManualClock;
use confluence::core::runtime::SignalRuntime;
use confluence::metrics::Metrics;
use confluence::models::signal::Direction;
use confluence::models::strategy::StrategyId;
use confluence::services::{JsonFileProvider, MemorySignalStore};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use crate::test_utils::{base_time, create_test_candles, symbols};

/// Wobbling decline whose last bar crosses %K over %D deep in oversold
fn oversold_cross_closes() -> Vec<f64> {
    (0..50)
        .map(|i| 200.0 - i as f64 + 1.5 * (i as f64 * 0.9).sin())
        .collect()
}

fn write_candles(root: &TempDir, symbol_dir: &str, timeframe: &str, closes: &[f64]) {
    let dir = root.path().join(symbol_dir);
    fs::create_dir_all(&dir).unwrap();
    let json = serde_json::to_string(&create_test_candles(closes)).unwrap();
    fs::write(dir.join(format!("{}.json", timeframe)), json).unwrap();
}

fn config() -> EngineConfig {
    EngineConfig {
        timeframes: vec!["1h".to_string(), "4h".to_string()],
        strategies: vec![StrategyId::RsiStoch],
        ..EngineConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cycle_from_candle_files() {
    let root = TempDir::new().unwrap();
    write_candles(&root, "BTC_USDT", "1h", &oversold_cross_closes());
    write_candles(&root, "BTC_USDT", "4h", &oversold_cross_closes());
    write_candles(&root, "ETH_USDT", "1h", &[100.0; 50]);

    let clock = Arc::new(ManualClock::new(base_time() + Duration::days(5)));
    let metrics = Arc::new(Metrics::new().unwrap());
    let store = MemorySignalStore::new();
    let runtime = SignalRuntime::from_config(
        &config(),
        Arc::new(JsonFileProvider::new(root.path())),
        clock.clone(),
        Some(metrics.clone()),
    )
    .unwrap()
    .with_sink(Arc::new(store.clone()));

    let universe = symbols(&["BTC/USDT", "ETH/USDT", "SOL/USDT"]);
    let report = runtime.run_cycle(&universe).await;

    assert_eq!(report.batch.failed_instruments, vec!["SOL/USDT"]);
    assert_eq!(report.batch.raw_signals, 2);
    assert_eq!(report.published.len(), 1);

    let signal = &report.published[0];
    assert_eq!(signal.symbol, "BTC/USDT");
    assert_eq!(signal.direction, Direction::Buy);
    assert_eq!(signal.confluence, 2);
    assert!(signal.is_multi_timeframe);
    assert_eq!(signal.timeframes, vec!["1h", "4h"]);
    assert_eq!(signal.strategies, vec![StrategyId::RsiStoch]);
    assert_eq!(signal.average_confidence, 0.9);
    // Capped at one after the multi-timeframe bonus
    assert_eq!(signal.final_confidence, 1.0);
    assert!((signal.price - 151.176147).abs() < 1e-5);
    assert!((signal.target - 157.360086).abs() < 1e-5);
    assert!((signal.stop_loss - 148.084178).abs() < 1e-5);
    assert_eq!(signal.timestamp, base_time() + Duration::days(5));

    let stored = store.signals().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, 1);

    // Same data one minute later: held back by the cooldown
    clock.advance(Duration::minutes(1));
    let again = runtime.run_cycle(&universe).await;
    assert!(again.published.is_empty());
    assert_eq!(again.suppressed, 1);

    let rendered = metrics.render().unwrap();
    assert!(rendered.contains("cycles_total 2"));
    assert!(rendered.contains("signals_published_total 1"));
    assert!(rendered.contains("signals_suppressed_total 1"));
    assert!(rendered.contains("instrument_failures_total 2"));
}

#[tokio::test]
async fn test_single_timeframe_needs_two_detectors() {
    let root = TempDir::new().unwrap();
    write_candles(&root, "BTC_USDT", "1h", &oversold_cross_closes());

    let runtime = SignalRuntime::from_config(
        &config(),
        Arc::new(JsonFileProvider::new(root.path())),
        Arc::new(ManualClock::new(base_time())),
        None,
    )
    .unwrap();

    let batch = runtime.evaluate(&symbols(&["BTC/USDT"])).await;
    assert_eq!(batch.raw_signals, 1);
    assert!(batch.signals.is_empty());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let root = TempDir::new().unwrap();
    let config = EngineConfig {
        min_confluence: 0,
        ..EngineConfig::default()
    };
    let result = SignalRuntime::from_config(
        &config,
        Arc::new(JsonFileProvider::new(root.path())),
        Arc::new(ManualClock::new(base_time())),
        None,
    );
    assert!(result.is_err());
}
