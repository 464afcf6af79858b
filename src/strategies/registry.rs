//! Ordered set of detectors run against every window

use std::sync::Arc;

use crate::models::strategy::{StrategyId, StrategyParams};
use crate::strategies::{
    BollingerBreakoutStrategy, ChannelBreakoutStrategy, EmaCrossStrategy, LevelBreakoutStrategy,
    MacdCrossStrategy, RsiDivergenceStrategy, RsiStochStrategy, Strategy, VolumeConfirmStrategy,
};

/// Detectors in registration order. Aggregated strategy lists follow this
/// order, so it is fixed at construction.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    /// All eight detectors in default order
    pub fn from_params(params: &StrategyParams) -> Self {
        Self::from_kinds(&StrategyId::ALL, params)
    }

    /// Only the given detectors, in the given order. Duplicates are dropped.
    pub fn from_kinds(kinds: &[StrategyId], params: &StrategyParams) -> Self {
        let mut seen = Vec::with_capacity(kinds.len());
        let strategies = kinds
            .iter()
            .filter(|kind| {
                if seen.contains(*kind) {
                    false
                } else {
                    seen.push(**kind);
                    true
                }
            })
            .map(|kind| Self::build(*kind, params))
            .collect();
        Self { strategies }
    }

    /// Arbitrary detectors, e.g. test doubles
    pub fn with_strategies(strategies: Vec<Arc<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    pub fn build(kind: StrategyId, params: &StrategyParams) -> Arc<dyn Strategy> {
        let risk = params.risk.clone();
        match kind {
            StrategyId::RsiStoch => Arc::new(RsiStochStrategy::new(params.rsi_stoch.clone(), risk)),
            StrategyId::BollingerBreakout => {
                Arc::new(BollingerBreakoutStrategy::new(params.bollinger.clone(), risk))
            }
            StrategyId::RsiDivergence => {
                Arc::new(RsiDivergenceStrategy::new(params.rsi_divergence.clone(), risk))
            }
            StrategyId::VolumeConfirm => {
                Arc::new(VolumeConfirmStrategy::new(params.volume_confirm.clone(), risk))
            }
            StrategyId::ChannelBreakout => {
                Arc::new(ChannelBreakoutStrategy::new(params.channel_breakout.clone(), risk))
            }
            StrategyId::EmaCross => Arc::new(EmaCrossStrategy::new(params.ema_cross.clone(), risk)),
            StrategyId::LevelBreakout => {
                Arc::new(LevelBreakoutStrategy::new(params.level_breakout.clone(), risk))
            }
            StrategyId::MacdCross => Arc::new(MacdCrossStrategy::new(params.macd_cross.clone(), risk)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Strategy>> {
        self.strategies.iter()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn ids(&self) -> Vec<StrategyId> {
        self.strategies.iter().map(|s| s.id()).collect()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::from_params(&StrategyParams::default())
    }
}
