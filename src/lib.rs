//! Multi-strategy confluence signal engine.
//!
//! Independent detectors scan OHLCV windows across timeframes; detections
//! that agree on a direction are merged into composite signals, rate-limited
//! per instrument and direction, and handed to sinks.

pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
pub mod strategies;

pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, MarketDataError, SinkError, StrategyError};
pub use models::{Candle, CompositeSignal, Direction, RawSignal, StrategyId, TimeframeData};
