//! Offline provider reading candle tables from JSON files.
//!
//! Layout: `<root>/<SYMBOL>/<timeframe>.json`, where `/` in the symbol is
//! written as `_` (`BTC/USDT` lives in `BTC_USDT/`). Each file holds an array
//! of candles, which is sorted by timestamp on load.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::MarketDataError;
use crate::models::indicators::{Candle, TimeframeData};
use crate::services::market_data::MarketDataProvider;

#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    root: PathBuf,
}

impl JsonFileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.root.join(symbol.replace('/', "_"))
    }

    async fn read_table(&self, symbol: &str, timeframe: &str) -> Result<Option<Vec<Candle>>, MarketDataError> {
        let path = self.symbol_dir(symbol).join(format!("{}.json", timeframe));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut candles: Vec<Candle> =
            serde_json::from_slice(&bytes).map_err(|e| MarketDataError::Malformed {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
                message: e.to_string(),
            })?;
        candles.sort_by_key(|c| c.timestamp);
        Ok(Some(candles))
    }
}

#[async_trait]
impl MarketDataProvider for JsonFileProvider {
    async fn fetch_timeframes(
        &self,
        symbol: &str,
        timeframes: &[String],
    ) -> Result<TimeframeData, MarketDataError> {
        if !tokio::fs::try_exists(self.symbol_dir(symbol)).await? {
            return Err(MarketDataError::UnknownSymbol(symbol.to_string()));
        }

        let mut data = TimeframeData::new();
        for timeframe in timeframes {
            match self.read_table(symbol, timeframe).await? {
                Some(candles) => {
                    data.insert(timeframe.clone(), candles);
                }
                None => debug!(symbol = %symbol, timeframe = %timeframe, "No candle file for timeframe"),
            }
        }
        Ok(data)
    }

    /// Directory names under the root, with `_` mapped back to `/`
    async fn list_symbols(&self) -> Result<Vec<String>, MarketDataError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut symbols = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                symbols.push(entry.file_name().to_string_lossy().replace('_', "/"));
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}
