//! Batch dispatcher: one task per instrument on a bounded pool, then
//! ranking, cooldown and publication.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::core::clock::Clock;
use crate::error::{EngineError, SinkError};
use crate::metrics::Metrics;
use crate::models::signal::CompositeSignal;
use crate::services::market_data::MarketDataProvider;
use crate::services::sinks::SignalSink;
use crate::signals::aggregation::Aggregator;
use crate::signals::cooldown::{CooldownKey, CooldownTracker, PublishOutcome};
use crate::signals::engine::{Analysis, SignalEngine};
use crate::strategies::StrategyRegistry;

/// Dispatcher settings
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub timeframes: Vec<String>,
    pub max_concurrency: usize,
    pub max_signals_per_cycle: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            timeframes: engine.timeframes,
            max_concurrency: engine.max_concurrency,
            max_signals_per_cycle: engine.max_signals_per_cycle,
        }
    }
}

/// Merged output of one dispatch over a set of instruments
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Composite signals sorted by final confidence, highest first
    pub signals: Vec<CompositeSignal>,
    pub raw_signals: usize,
    pub strategy_failures: usize,
    /// Instruments that produced nothing because their task failed
    pub failed_instruments: Vec<String>,
}

/// What one cycle did
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub instruments: usize,
    pub batch: BatchResult,
    pub published: Vec<CompositeSignal>,
    pub suppressed: usize,
    /// Ranked below the per-cycle cap; cooldown untouched
    pub dropped: usize,
    pub delivery_failures: usize,
    pub elapsed: Duration,
}

pub struct SignalRuntime {
    config: RuntimeConfig,
    engine: Arc<SignalEngine>,
    provider: Arc<dyn MarketDataProvider>,
    cooldown: Arc<CooldownTracker>,
    clock: Arc<dyn Clock>,
    sinks: Vec<Arc<dyn SignalSink>>,
    metrics: Option<Arc<Metrics>>,
}

impl SignalRuntime {
    pub fn new(
        config: RuntimeConfig,
        engine: Arc<SignalEngine>,
        provider: Arc<dyn MarketDataProvider>,
        cooldown: Arc<CooldownTracker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            engine,
            provider,
            cooldown,
            clock,
            sinks: Vec::new(),
            metrics: None,
        }
    }

    /// Wire engine, cooldown and dispatcher from one validated config
    pub fn from_config(
        config: &EngineConfig,
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn Clock>,
        metrics: Option<Arc<Metrics>>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let registry = StrategyRegistry::from_kinds(&config.strategies, &config.params);
        let mut engine = SignalEngine::new(registry, Aggregator::new(config.aggregation()))
            .with_min_candles(config.min_candles);
        if let Some(metrics) = &metrics {
            engine = engine.with_metrics(metrics.clone());
        }
        let cooldown = CooldownTracker::new(config.cooldown()?, clock.clone());
        let runtime_config = RuntimeConfig {
            timeframes: config.timeframes.clone(),
            max_concurrency: config.max_concurrency,
            max_signals_per_cycle: config.max_signals_per_cycle,
        };
        let runtime = Self::new(
            runtime_config,
            Arc::new(engine),
            provider,
            Arc::new(cooldown),
            clock,
        );
        Ok(match metrics {
            Some(metrics) => runtime.with_metrics(metrics),
            None => runtime,
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn SignalSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    /// Analyse every instrument on the bounded pool. A failing instrument
    /// contributes nothing and never aborts the batch.
    pub async fn evaluate(&self, symbols: &[String]) -> BatchResult {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let timeframes = Arc::new(self.config.timeframes.clone());
        let now = self.clock.now();
        let mut tasks = JoinSet::new();

        for symbol in symbols {
            let symbol = symbol.clone();
            let permits = permits.clone();
            let provider = self.provider.clone();
            let engine = self.engine.clone();
            let timeframes = timeframes.clone();

            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (symbol, Err(e.to_string())),
                };

                let data = match provider.fetch_timeframes(&symbol, &timeframes).await {
                    Ok(data) => data,
                    Err(e) => return (symbol, Err(e.to_string())),
                };

                let task_symbol = symbol.clone();
                let analysis =
                    tokio::task::spawn_blocking(move || engine.analyze(&task_symbol, &data, now)).await;
                match analysis {
                    Ok(analysis) => (symbol, Ok(analysis)),
                    Err(e) => (symbol, Err(format!("analysis task failed: {}", e))),
                }
            });
        }

        let mut result = BatchResult::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(Analysis {
                    raw_signals,
                    composites,
                    strategy_failures,
                }))) => {
                    result.raw_signals += raw_signals.len();
                    result.strategy_failures += strategy_failures;
                    result.signals.extend(composites);
                }
                Ok((symbol, Err(message))) => {
                    error!(symbol = %symbol, error = %message, "Instrument evaluation failed");
                    result.failed_instruments.push(symbol);
                }
                Err(e) => {
                    error!(error = %e, "Instrument task aborted");
                    result.failed_instruments.push(String::from("<unknown>"));
                }
            }
        }

        result.signals.sort_by(rank);
        result.failed_instruments.sort();
        result
    }

    /// Deliver to every sink under the key's cooldown lock. A sink error
    /// leaves the key unmarked.
    pub async fn publish(&self, signal: &CompositeSignal) -> Result<PublishOutcome, SinkError> {
        let key = CooldownKey::new(signal.symbol.clone(), signal.direction);
        self.cooldown
            .try_publish(&key, || async {
                for sink in &self.sinks {
                    sink.publish(signal).await?;
                }
                Ok::<(), SinkError>(())
            })
            .await
    }

    /// Evaluate, rank, then publish at most `max_signals_per_cycle` signals
    pub async fn run_cycle(&self, symbols: &[String]) -> CycleReport {
        let started = Instant::now();
        let batch = self.evaluate(symbols).await;

        let mut report = CycleReport {
            instruments: symbols.len(),
            ..CycleReport::default()
        };

        for signal in &batch.signals {
            if report.published.len() >= self.config.max_signals_per_cycle {
                report.dropped += 1;
                continue;
            }
            match self.publish(signal).await {
                Ok(PublishOutcome::Published) => report.published.push(signal.clone()),
                Ok(PublishOutcome::Suppressed) => report.suppressed += 1,
                Err(e) => {
                    warn!(
                        symbol = %signal.symbol,
                        direction = ?signal.direction,
                        error = %e,
                        "Signal delivery failed, cooldown left unmarked"
                    );
                    report.delivery_failures += 1;
                }
            }
        }

        report.batch = batch;
        report.elapsed = started.elapsed();

        if let Some(metrics) = &self.metrics {
            metrics.cycles_total.inc();
            metrics.instruments_scanned_total.inc_by(report.instruments as u64);
            metrics
                .instrument_failures_total
                .inc_by(report.batch.failed_instruments.len() as u64);
            metrics.signals_published_total.inc_by(report.published.len() as u64);
            metrics.signals_suppressed_total.inc_by(report.suppressed as u64);
            metrics.cycle_duration_seconds.observe(report.elapsed.as_secs_f64());
        }

        info!(
            instruments = report.instruments,
            signals = report.batch.signals.len(),
            published = report.published.len(),
            suppressed = report.suppressed,
            dropped = report.dropped,
            failures = report.batch.failed_instruments.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Cycle complete"
        );
        report
    }
}

/// Final confidence descending, then symbol and direction for a stable order
fn rank(a: &CompositeSignal, b: &CompositeSignal) -> Ordering {
    b.final_confidence
        .total_cmp(&a.final_confidence)
        .then_with(|| a.symbol.cmp(&b.symbol))
        .then_with(|| a.direction.cmp(&b.direction))
}
