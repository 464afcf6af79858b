//! Collaborators at the edges of the engine: data in, signals out.

pub mod json_provider;
pub mod market_data;
pub mod sinks;

pub use json_provider::JsonFileProvider;
pub use market_data::{MarketDataProvider, StaticMarketDataProvider};
pub use sinks::{LogSink, MemorySignalStore, Outcome, PerformanceStats, SignalSink, StoredSignal};
