//! Destinations for published signals.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::common::math;
use crate::error::SinkError;
use crate::models::signal::{CompositeSignal, Direction};

#[async_trait]
pub trait SignalSink: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, signal: &CompositeSignal) -> Result<(), SinkError>;
}

/// Notifier that writes the human-readable summary to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl SignalSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, signal: &CompositeSignal) -> Result<(), SinkError> {
        info!(
            symbol = %signal.symbol,
            direction = ?signal.direction,
            final_confidence = signal.final_confidence,
            "\n{}",
            signal.summary()
        );
        Ok(())
    }
}

/// Closed trade result for a stored signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outcome {
    pub exit_price: f64,
    pub pnl_percent: f64,
    pub win: bool,
    pub closed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSignal {
    pub id: u64,
    pub signal: CompositeSignal,
    pub outcome: Option<Outcome>,
}

/// Aggregate win/loss figures. Percentages are rounded to two decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceStats {
    pub total_signals: usize,
    pub closed_signals: usize,
    pub open_signals: usize,
    pub total_wins: usize,
    pub total_losses: usize,
    pub win_rate: f64,
    pub avg_profit: f64,
    pub avg_loss: f64,
}

#[derive(Default)]
struct StoreState {
    next_id: u64,
    signals: Vec<StoredSignal>,
}

/// In-memory performance store: keeps every published signal and its
/// eventual outcome
#[derive(Clone, Default)]
pub struct MemorySignalStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a signal and return its id (ids start at 1)
    pub async fn save(&self, signal: &CompositeSignal) -> u64 {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = state.next_id;
        state.signals.push(StoredSignal {
            id,
            signal: signal.clone(),
            outcome: None,
        });
        id
    }

    /// Close a stored signal at `exit_price`. Returns the PnL in percent,
    /// signed for the signal's direction. Recording again overwrites.
    pub async fn record_outcome(
        &self,
        id: u64,
        exit_price: f64,
        win: bool,
        closed_at: DateTime<Utc>,
    ) -> Result<f64, SinkError> {
        let mut state = self.state.write().await;
        let stored = state
            .signals
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SinkError::UnknownSignal(id))?;

        let entry = stored.signal.price;
        let pnl_percent = match stored.signal.direction {
            Direction::Buy => (exit_price - entry) / entry * 100.0,
            Direction::Short => (entry - exit_price) / entry * 100.0,
        };
        stored.outcome = Some(Outcome {
            exit_price,
            pnl_percent,
            win,
            closed_at,
        });
        Ok(pnl_percent)
    }

    pub async fn get(&self, id: u64) -> Option<StoredSignal> {
        self.state.read().await.signals.iter().find(|s| s.id == id).cloned()
    }

    pub async fn signals(&self) -> Vec<StoredSignal> {
        self.state.read().await.signals.clone()
    }

    pub async fn open_signals(&self) -> Vec<StoredSignal> {
        self.state
            .read()
            .await
            .signals
            .iter()
            .filter(|s| s.outcome.is_none())
            .cloned()
            .collect()
    }

    pub async fn stats(&self) -> PerformanceStats {
        let state = self.state.read().await;
        let outcomes: Vec<&Outcome> = state.signals.iter().filter_map(|s| s.outcome.as_ref()).collect();

        let wins: Vec<f64> = outcomes.iter().filter(|o| o.win).map(|o| o.pnl_percent).collect();
        let losses: Vec<f64> = outcomes.iter().filter(|o| !o.win).map(|o| o.pnl_percent).collect();
        let mean = |values: &[f64]| {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        };

        let closed = outcomes.len();
        let win_rate = if closed > 0 {
            wins.len() as f64 / closed as f64 * 100.0
        } else {
            0.0
        };

        PerformanceStats {
            total_signals: state.signals.len(),
            closed_signals: closed,
            open_signals: state.signals.len() - closed,
            total_wins: wins.len(),
            total_losses: losses.len(),
            win_rate: math::round_to(win_rate, 2),
            avg_profit: math::round_to(mean(&wins), 2),
            avg_loss: math::round_to(mean(&losses), 2),
        }
    }
}

#[async_trait]
impl SignalSink for MemorySignalStore {
    fn name(&self) -> &str {
        "memory_store"
    }

    async fn publish(&self, signal: &CompositeSignal) -> Result<(), SinkError> {
        self.save(signal).await;
        Ok(())
    }
}
