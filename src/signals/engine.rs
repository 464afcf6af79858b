//! Per-instrument analysis: every registered strategy over every timeframe,
//! then confluence aggregation.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::metrics::Metrics;
use crate::models::indicators::TimeframeData;
use crate::models::signal::{CompositeSignal, RawSignal};
use crate::signals::aggregation::Aggregator;
use crate::strategies::{CandleWindow, Strategy, StrategyRegistry};

/// Timeframes shorter than this are skipped before any strategy runs
pub const MIN_CANDLES: usize = 30;

/// Result of analysing one instrument
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub raw_signals: Vec<RawSignal>,
    pub composites: Vec<CompositeSignal>,
    /// Strategy evaluations that errored or panicked
    pub strategy_failures: usize,
}

pub struct SignalEngine {
    registry: StrategyRegistry,
    aggregator: Aggregator,
    min_candles: usize,
    metrics: Option<Arc<Metrics>>,
}

impl SignalEngine {
    pub fn new(registry: StrategyRegistry, aggregator: Aggregator) -> Self {
        info!(
            strategies = registry.len(),
            min_confluence = aggregator.config().min_confluence,
            "Signal engine initialized"
        );
        Self {
            registry,
            aggregator,
            min_candles: MIN_CANDLES,
            metrics: None,
        }
    }

    pub fn with_min_candles(mut self, min_candles: usize) -> Self {
        self.min_candles = min_candles;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Run every strategy on every timeframe table and aggregate the
    /// detections. Timeframes are visited in label order and strategies in
    /// registry order, which fixes the discovery order of reasons.
    pub fn analyze(&self, symbol: &str, data: &TimeframeData, now: DateTime<Utc>) -> Analysis {
        let mut analysis = Analysis::default();

        for (timeframe, candles) in data {
            if candles.len() < self.min_candles {
                debug!(
                    symbol = %symbol,
                    timeframe = %timeframe,
                    candles = candles.len(),
                    "Skipping timeframe with too few candles"
                );
                continue;
            }

            let window = CandleWindow::new(symbol, timeframe, candles);
            for strategy in self.registry.iter() {
                match evaluate(strategy.as_ref(), &window) {
                    Ok(Some(signal)) => {
                        debug!(
                            symbol = %symbol,
                            timeframe = %timeframe,
                            strategy = %signal.strategy,
                            direction = ?signal.direction,
                            score = signal.score,
                            "Strategy detection"
                        );
                        analysis.raw_signals.push(signal);
                    }
                    Ok(None) => {}
                    Err(error) => {
                        warn!(
                            symbol = %symbol,
                            timeframe = %timeframe,
                            strategy = %strategy.id(),
                            error = %error,
                            "Strategy evaluation failed, treating as abstention"
                        );
                        analysis.strategy_failures += 1;
                    }
                }
            }
        }

        analysis.composites = self.aggregator.aggregate(symbol, &analysis.raw_signals, now);

        if let Some(metrics) = &self.metrics {
            metrics.raw_signals_total.inc_by(analysis.raw_signals.len() as u64);
            metrics.strategy_failures_total.inc_by(analysis.strategy_failures as u64);
            metrics.composite_signals_total.inc_by(analysis.composites.len() as u64);
        }
        analysis
    }
}

/// One isolated strategy call. Errors and panics both come back as `Err`;
/// invalid signals are dropped.
fn evaluate(strategy: &dyn Strategy, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, String> {
    match catch_unwind(AssertUnwindSafe(|| strategy.analyze(window))) {
        Ok(Ok(signal)) => Ok(signal.filter(RawSignal::is_valid)),
        Ok(Err(error)) => Err(error.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
