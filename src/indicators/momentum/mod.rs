//! Momentum indicators: RSI, stochastic RSI, MACD

pub mod macd;
pub mod rsi;
pub mod stoch_rsi;

pub use macd::*;
pub use rsi::*;
pub use stoch_rsi::*;
