//! Confluence aggregation: same-direction detections merged into one trade idea

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::math;
use crate::models::signal::{CompositeSignal, Direction, RawSignal};
use crate::models::strategy::StrategyId;

/// How raw signals count toward the confluence threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfluenceVoting {
    /// Every raw signal is one vote, including repeats of a strategy on
    /// other timeframes
    #[default]
    PerSignal,
    /// One vote per strategy: its highest-scoring signal (earliest on ties)
    PerStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub min_confluence: usize,
    /// Flat confidence bonus when votes span two or more timeframes
    pub mtf_bonus: f64,
    pub voting: ConfluenceVoting,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            min_confluence: 2,
            mtf_bonus: 0.10,
            voting: ConfluenceVoting::PerSignal,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregationConfig,
}

impl Aggregator {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Build at most one composite per direction, BUY before SHORT.
    /// Directions below `min_confluence` are dropped silently.
    pub fn aggregate(&self, symbol: &str, signals: &[RawSignal], now: DateTime<Utc>) -> Vec<CompositeSignal> {
        if signals.is_empty() {
            return Vec::new();
        }

        Direction::ALL
            .iter()
            .filter_map(|&direction| {
                let group: Vec<&RawSignal> = signals.iter().filter(|s| s.direction == direction).collect();
                let votes = self.votes(group);
                if votes.is_empty() || votes.len() < self.config.min_confluence {
                    return None;
                }
                let composite = self.compose(symbol, direction, &votes, now)?;
                info!(
                    symbol = %composite.symbol,
                    direction = ?composite.direction,
                    confluence = composite.confluence,
                    final_confidence = composite.final_confidence,
                    mtf = composite.is_multi_timeframe,
                    "Composite signal built"
                );
                Some(composite)
            })
            .collect()
    }

    fn votes<'a>(&self, group: Vec<&'a RawSignal>) -> Vec<&'a RawSignal> {
        match self.config.voting {
            ConfluenceVoting::PerSignal => group,
            ConfluenceVoting::PerStrategy => {
                let mut best: Vec<&RawSignal> = Vec::new();
                for signal in group {
                    match best.iter_mut().find(|b| b.strategy == signal.strategy) {
                        Some(current) if signal.score > current.score => *current = signal,
                        Some(_) => {}
                        None => best.push(signal),
                    }
                }
                best
            }
        }
    }

    fn compose(
        &self,
        symbol: &str,
        direction: Direction,
        votes: &[&RawSignal],
        now: DateTime<Utc>,
    ) -> Option<CompositeSignal> {
        let price = weighted_mean(votes, |s| s.price)?;
        let target = weighted_mean(votes, |s| s.target)?;
        let stop_loss = weighted_mean(votes, |s| s.stop_loss)?;

        let average = math::round_to(
            votes.iter().map(|s| s.score).sum::<f64>() / votes.len() as f64,
            2,
        );

        let mut timeframes: Vec<String> = Vec::new();
        let mut strategies: Vec<StrategyId> = Vec::new();
        for signal in votes {
            if !timeframes.contains(&signal.timeframe) {
                timeframes.push(signal.timeframe.clone());
            }
            if !strategies.contains(&signal.strategy) {
                strategies.push(signal.strategy);
            }
        }
        let is_multi_timeframe = timeframes.len() >= 2;

        // The bonus applies to the already rounded average
        let boosted = if is_multi_timeframe {
            average + self.config.mtf_bonus
        } else {
            average
        };
        let final_confidence = math::round_to(boosted.clamp(0.0, 1.0), 2);

        Some(CompositeSignal {
            symbol: symbol.to_string(),
            direction,
            price,
            target,
            stop_loss,
            confluence: votes.len(),
            average_confidence: average,
            final_confidence,
            timeframes,
            strategies,
            reasons: votes.iter().map(|s| s.reason.clone()).collect(),
            is_multi_timeframe,
            timestamp: now,
        })
    }
}

/// Σ(value·score)/Σ(score), clamped into the inputs' range. An all-zero score
/// group falls back to the plain mean.
fn weighted_mean(votes: &[&RawSignal], value: impl Fn(&RawSignal) -> f64) -> Option<f64> {
    let total_score: f64 = votes.iter().map(|s| s.score).sum();
    let mean = if total_score > 0.0 {
        votes.iter().map(|&s| value(s) * s.score).sum::<f64>() / total_score
    } else {
        votes.iter().map(|&s| value(s)).sum::<f64>() / votes.len() as f64
    };

    let (lo, hi) = votes
        .iter()
        .map(|&s| value(s))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    math::finite(mean).map(|m| m.clamp(lo, hi))
}

