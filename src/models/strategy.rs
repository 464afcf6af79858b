//! Detector identifiers and their tunable parameters

use serde::{Deserialize, Serialize};
use std::fmt;

/// The known detector variants, in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    RsiStoch,
    BollingerBreakout,
    RsiDivergence,
    VolumeConfirm,
    ChannelBreakout,
    EmaCross,
    LevelBreakout,
    MacdCross,
}

impl StrategyId {
    pub const ALL: [StrategyId; 8] = [
        StrategyId::RsiStoch,
        StrategyId::BollingerBreakout,
        StrategyId::RsiDivergence,
        StrategyId::VolumeConfirm,
        StrategyId::ChannelBreakout,
        StrategyId::EmaCross,
        StrategyId::LevelBreakout,
        StrategyId::MacdCross,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::RsiStoch => "rsi_stoch",
            StrategyId::BollingerBreakout => "bollinger_breakout",
            StrategyId::RsiDivergence => "rsi_divergence",
            StrategyId::VolumeConfirm => "volume_confirm",
            StrategyId::ChannelBreakout => "channel_breakout",
            StrategyId::EmaCross => "ema_cross",
            StrategyId::LevelBreakout => "level_breakout",
            StrategyId::MacdCross => "macd_cross",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target/stop sizing shared by every detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    /// Target distance = stop distance × ratio
    pub risk_reward_ratio: f64,
    /// Fixed stop distance in percent of price
    pub stop_loss_percent: f64,
    pub atr_period: usize,
    /// Stop distance = ATR × multiplier
    pub atr_multiplier: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            risk_reward_ratio: 2.0,
            stop_loss_percent: 1.5,
            atr_period: 14,
            atr_multiplier: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiStochParams {
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub k_smoothing: usize,
    pub d_smoothing: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub extreme_oversold: f64,
    pub extreme_overbought: f64,
    /// %K must sit below this for a BUY cross
    pub stoch_oversold: f64,
    /// %K must sit above this for a SHORT cross
    pub stoch_overbought: f64,
}

impl Default for RsiStochParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            stoch_period: 14,
            k_smoothing: 3,
            d_smoothing: 3,
            oversold: 30.0,
            overbought: 70.0,
            extreme_oversold: 20.0,
            extreme_overbought: 80.0,
            stoch_oversold: 20.0,
            stoch_overbought: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub period: usize,
    pub std_dev: f64,
    /// Bandwidth ((upper - lower) / middle) below this counts as a squeeze
    pub squeeze_threshold: f64,
    /// Bars before the breakout searched for a squeeze
    pub squeeze_lookback: usize,
    /// Consecutive closes outside the band required to trigger
    pub confirm_bars: usize,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
            squeeze_threshold: 0.04,
            squeeze_lookback: 20,
            confirm_bars: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiDivergenceParams {
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub divergence_lookback: usize,
    /// Half-width of the swing confirmation window
    pub swing_window: usize,
    /// Minimum relative price move between the two swings
    pub min_price_swing: f64,
}

impl Default for RsiDivergenceParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            divergence_lookback: 20,
            swing_window: 2,
            min_price_swing: 0.03,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfirmParams {
    pub volume_period: usize,
    pub spike_multiplier: f64,
    /// Candles with body / range below this are treated as doji
    pub min_body_ratio: f64,
    /// Smallest open-to-close move, as a fraction of the open
    pub min_move: f64,
    /// Closes ranked against the last `percentile_window` closes, the
    /// current one included
    pub percentile_window: usize,
    pub bottom_percentile: f64,
    pub top_percentile: f64,
}

impl Default for VolumeConfirmParams {
    fn default() -> Self {
        Self {
            volume_period: 20,
            spike_multiplier: 2.0,
            min_body_ratio: 0.4,
            min_move: 0.005,
            percentile_window: 20,
            bottom_percentile: 0.35,
            top_percentile: 0.65,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelBreakoutParams {
    pub lookback_period: usize,
    pub volume_multiplier: f64,
    pub min_channel_width: f64,
    pub min_r_squared: f64,
}

impl Default for ChannelBreakoutParams {
    fn default() -> Self {
        Self {
            lookback_period: 50,
            volume_multiplier: 1.5,
            min_channel_width: 0.02,
            min_r_squared: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaCrossParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub adx_period: usize,
    pub min_adx: f64,
}

impl Default for EmaCrossParams {
    fn default() -> Self {
        Self {
            fast_period: 50,
            slow_period: 200,
            adx_period: 14,
            min_adx: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelBreakoutParams {
    /// Bars before the current one searched for swing extrema
    pub swing_lookback: usize,
    pub swing_window: usize,
    /// Relative distance within which swings join one level
    pub cluster_tolerance: f64,
    /// Maximum relative distance of the close past the broken level
    pub proximity_threshold: f64,
    pub min_touches: usize,
    pub breakout_volume_multiplier: f64,
    pub volume_period: usize,
}

impl Default for LevelBreakoutParams {
    fn default() -> Self {
        Self {
            swing_lookback: 50,
            swing_window: 2,
            cluster_tolerance: 0.005,
            proximity_threshold: 0.005,
            min_touches: 2,
            breakout_volume_multiplier: 1.3,
            volume_period: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdCrossParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdCrossParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// Parameters for every registered detector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub risk: RiskParams,
    pub rsi_stoch: RsiStochParams,
    pub bollinger: BollingerParams,
    pub rsi_divergence: RsiDivergenceParams,
    pub volume_confirm: VolumeConfirmParams,
    pub channel_breakout: ChannelBreakoutParams,
    pub ema_cross: EmaCrossParams,
    pub level_breakout: LevelBreakoutParams,
    pub macd_cross: MacdCrossParams,
}
