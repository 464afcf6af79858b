//! Detector output and the composite trade idea built from it

use crate::models::strategy::StrategyId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Short,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Buy, Direction::Short];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detector's opinion on one instrument and timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSignal {
    pub symbol: String,
    pub timeframe: String,
    pub strategy: StrategyId,
    pub direction: Direction,
    pub price: f64,
    pub target: f64,
    pub stop_loss: f64,
    pub score: f64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl RawSignal {
    /// Finite prices ordered for the direction and a score in [0, 1].
    /// BUY: target > price > stop. SHORT: target < price < stop.
    pub fn is_valid(&self) -> bool {
        let finite = self.price.is_finite()
            && self.target.is_finite()
            && self.stop_loss.is_finite()
            && self.score.is_finite();
        if !finite || !(0.0..=1.0).contains(&self.score) || self.price <= 0.0 {
            return false;
        }
        match self.direction {
            Direction::Buy => self.target > self.price && self.price > self.stop_loss,
            Direction::Short => self.target < self.price && self.price < self.stop_loss,
        }
    }
}

/// Engine output: every same-direction detection for one instrument, merged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSignal {
    pub symbol: String,
    pub direction: Direction,
    pub price: f64,
    pub target: f64,
    pub stop_loss: f64,
    pub confluence: usize,
    pub average_confidence: f64,
    pub final_confidence: f64,
    pub timeframes: Vec<String>,
    pub strategies: Vec<StrategyId>,
    pub reasons: Vec<String>,
    pub is_multi_timeframe: bool,
    pub timestamp: DateTime<Utc>,
}

impl CompositeSignal {
    /// Signed percent distance from the entry price to `level`
    pub fn percent_from_entry(&self, level: f64) -> f64 {
        if self.price == 0.0 {
            return 0.0;
        }
        (level - self.price) / self.price * 100.0
    }

    /// Multi-line human-readable rendering
    pub fn summary(&self) -> String {
        let rule = "=".repeat(50);
        let mtf = if self.is_multi_timeframe { " [MTF]" } else { "" };
        let strategies: Vec<&str> = self.strategies.iter().map(|s| s.as_str()).collect();

        let mut lines = vec![
            rule.clone(),
            format!(
                "{} | {} | {}{}",
                self.direction,
                self.symbol,
                self.timeframes.join("+"),
                mtf
            ),
            format!("  Entry  : {}", self.price),
            format!(
                "  Target : {}  ({:+.2}%)",
                self.target,
                self.percent_from_entry(self.target)
            ),
            format!(
                "  Stop   : {}  ({:+.2}%)",
                self.stop_loss,
                self.percent_from_entry(self.stop_loss)
            ),
            format!(
                "  Score  : {:.0}%  |  Confluence: {} detections",
                self.final_confidence * 100.0,
                self.confluence
            ),
            format!("  Strategies: {}", strategies.join(", ")),
            "  Reasons:".to_string(),
        ];
        lines.extend(self.reasons.iter().map(|r| format!("    - {}", r)));
        lines.push(rule);
        lines.join("\n")
    }
}
