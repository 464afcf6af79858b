//! Error types for the signal engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {value}")]
    Env { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("market data unavailable for {symbol}: {message}")]
    Unavailable { symbol: String, message: String },

    #[error("malformed market data for {symbol}/{timeframe}: {message}")]
    Malformed {
        symbol: String,
        timeframe: String,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("non-finite candle data at index {0}")]
    NonFiniteInput(usize),

    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("signal delivery failed: {0}")]
    Delivery(String),

    #[error("unknown stored signal id: {0}")]
    UnknownSignal(u64),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("scheduler error: {0}")]
    Scheduler(String),
}
