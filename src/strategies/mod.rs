//! Detector variants that turn one OHLCV window into at most one raw signal.
//!
//! Every strategy is a pure function of its window: instances hold only
//! read-only parameters and are shared across worker threads, so working
//! buffers are allocated per call.

pub mod bollinger_breakout;
pub mod channel_breakout;
pub mod ema_cross;
pub mod level_breakout;
pub mod macd_cross;
pub mod registry;
pub mod rsi_divergence;
pub mod rsi_stoch;
pub mod volume_confirm;

pub use bollinger_breakout::BollingerBreakoutStrategy;
pub use channel_breakout::ChannelBreakoutStrategy;
pub use ema_cross::EmaCrossStrategy;
pub use level_breakout::LevelBreakoutStrategy;
pub use macd_cross::MacdCrossStrategy;
pub use registry::StrategyRegistry;
pub use rsi_divergence::RsiDivergenceStrategy;
pub use rsi_stoch::RsiStochStrategy;
pub use volume_confirm::VolumeConfirmStrategy;

use crate::error::StrategyError;
use crate::models::indicators::Candle;
use crate::models::signal::{Direction, RawSignal};
use crate::models::strategy::StrategyId;
use crate::signals::decision::TradeLevels;

/// One instrument's candles for one timeframe, ascending by time
#[derive(Debug, Clone, Copy)]
pub struct CandleWindow<'a> {
    pub symbol: &'a str,
    pub timeframe: &'a str,
    pub candles: &'a [Candle],
}

impl<'a> CandleWindow<'a> {
    pub fn new(symbol: &'a str, timeframe: &'a str, candles: &'a [Candle]) -> Self {
        Self {
            symbol,
            timeframe,
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    /// Fails on the first candle carrying a NaN or infinite field
    pub fn ensure_finite(&self) -> Result<(), StrategyError> {
        match self.candles.iter().position(|c| !c.is_finite()) {
            Some(index) => Err(StrategyError::NonFiniteInput(index)),
            None => Ok(()),
        }
    }

    /// Build the raw signal for the last candle. Returns `None` when the
    /// result would break the price ordering or carry a non-finite value.
    pub fn signal(
        &self,
        strategy: StrategyId,
        direction: Direction,
        levels: TradeLevels,
        score: f64,
        reason: String,
    ) -> Option<RawSignal> {
        let last = self.candles.last()?;
        let signal = RawSignal {
            symbol: self.symbol.to_string(),
            timeframe: self.timeframe.to_string(),
            strategy,
            direction,
            price: last.close,
            target: levels.target,
            stop_loss: levels.stop_loss,
            score: score.clamp(0.0, 1.0),
            reason,
            timestamp: last.timestamp,
        };
        signal.is_valid().then_some(signal)
    }
}

/// A detector over one window
pub trait Strategy: Send + Sync {
    fn id(&self) -> StrategyId;

    /// Shortest window the detector can evaluate; anything shorter abstains
    fn min_candles(&self) -> usize;

    /// `Ok(None)` is abstention, including for short windows and degenerate
    /// numerics.
    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError>;
}

/// Average of `period` values ending just before `end`
pub(crate) fn trailing_mean(values: &[f64], end: usize, period: usize) -> Option<f64> {
    if period == 0 || end < period || end > values.len() {
        return None;
    }
    let mean = values[end - period..end].iter().sum::<f64>() / period as f64;
    mean.is_finite().then_some(mean)
}
