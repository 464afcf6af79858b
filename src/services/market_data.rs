//! Market data provider interface and an in-memory implementation.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::MarketDataError;
use crate::models::indicators::{Candle, TimeframeData};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Candle tables for the requested timeframes, ascending by time.
    /// A timeframe the source does not have is simply absent from the map.
    async fn fetch_timeframes(
        &self,
        symbol: &str,
        timeframes: &[String],
    ) -> Result<TimeframeData, MarketDataError>;

    /// Every symbol the source can serve
    async fn list_symbols(&self) -> Result<Vec<String>, MarketDataError>;
}

/// Provider backed by tables held in memory
#[derive(Clone, Default)]
pub struct StaticMarketDataProvider {
    data: Arc<RwLock<BTreeMap<String, TimeframeData>>>,
}

impl StaticMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, symbol: impl Into<String>, timeframe: impl Into<String>, candles: Vec<Candle>) {
        let mut data = self.data.write().await;
        data.entry(symbol.into())
            .or_default()
            .insert(timeframe.into(), candles);
    }

    pub async fn remove(&self, symbol: &str) {
        self.data.write().await.remove(symbol);
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn fetch_timeframes(
        &self,
        symbol: &str,
        timeframes: &[String],
    ) -> Result<TimeframeData, MarketDataError> {
        let data = self.data.read().await;
        let tables = data
            .get(symbol)
            .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.to_string()))?;

        Ok(timeframes
            .iter()
            .filter_map(|tf| tables.get(tf).map(|candles| (tf.clone(), candles.clone())))
            .collect())
    }

    async fn list_symbols(&self) -> Result<Vec<String>, MarketDataError> {
        Ok(self.data.read().await.keys().cloned().collect())
    }
}
