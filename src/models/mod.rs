//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;
pub mod strategy;

pub use indicators::{
    AdxIndicator, AtrIndicator, Candle, EmaIndicator, MacdIndicator,
    PriceLevel, RegressionChannel, StochRsiIndicator, SwingPoint, TimeframeData,
};
pub use signal::{CompositeSignal, Direction, RawSignal};
pub use strategy::{
    BollingerParams, ChannelBreakoutParams, EmaCrossParams, LevelBreakoutParams, MacdCrossParams,
    RiskParams, RsiDivergenceParams, RsiStochParams, StrategyId, StrategyParams,
    VolumeConfirmParams,
};
