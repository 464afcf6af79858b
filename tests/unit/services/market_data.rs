//! Unit tests for the in-memory market data provider

use confluence::error::MarketDataError;
use confluence::services::{MarketDataProvider, StaticMarketDataProvider};

use crate::test_utils::create_test_candles;

fn timeframes(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_fetch_returns_requested_timeframes() {
    let provider = StaticMarketDataProvider::new();
    provider.insert("BTC/USDT", "1h", create_test_candles(&[100.0; 40])).await;
    provider.insert("BTC/USDT", "4h", create_test_candles(&[100.0; 35])).await;
    provider.insert("BTC/USDT", "1d", create_test_candles(&[100.0; 30])).await;

    let data = provider
        .fetch_timeframes("BTC/USDT", &timeframes(&["1h", "4h"]))
        .await
        .unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data["1h"].len(), 40);
    assert_eq!(data["4h"].len(), 35);
}

#[tokio::test]
async fn test_missing_timeframe_is_absent() {
    let provider = StaticMarketDataProvider::new();
    provider.insert("ETH/USDT", "1h", create_test_candles(&[100.0; 40])).await;

    let data = provider
        .fetch_timeframes("ETH/USDT", &timeframes(&["15m", "1h"]))
        .await
        .unwrap();
    assert!(!data.contains_key("15m"));
    assert!(data.contains_key("1h"));
}

#[tokio::test]
async fn test_unknown_symbol_is_an_error() {
    let provider = StaticMarketDataProvider::new();
    let result = provider.fetch_timeframes("DOGE/USDT", &timeframes(&["1h"])).await;
    assert!(matches!(result, Err(MarketDataError::UnknownSymbol(ref s)) if s == "DOGE/USDT"));
}

#[tokio::test]
async fn test_list_and_remove_symbols() {
    let provider = StaticMarketDataProvider::new();
    provider.insert("SOL/USDT", "1h", create_test_candles(&[10.0; 5])).await;
    provider.insert("BTC/USDT", "1h", create_test_candles(&[10.0; 5])).await;
    assert_eq!(provider.list_symbols().await.unwrap(), vec!["BTC/USDT", "SOL/USDT"]);

    provider.remove("BTC/USDT").await;
    assert_eq!(provider.list_symbols().await.unwrap(), vec!["SOL/USDT"]);
}
