#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use confluence::core::clock::{Clock, ManualClock};
use confluence::core::runtime::{RuntimeConfig, SignalRuntime};
use confluence::error::{SinkError, StrategyError};
use confluence::models::indicators::Candle;
use confluence::models::signal::{CompositeSignal, Direction, RawSignal};
use confluence::models::strategy::StrategyId;
use confluence::services::{MarketDataProvider, SignalSink, StaticMarketDataProvider};
use confluence::signals::aggregation::Aggregator;
use confluence::signals::cooldown::CooldownTracker;
use confluence::signals::decision::TradeLevels;
use confluence::signals::engine::SignalEngine;
use confluence::strategies::{CandleWindow, Strategy, StrategyRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn create_test_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i > 0 { closes[i - 1] } else { close };
            Candle::new(
                open,
                open.max(close) + 0.5,
                open.min(close) - 0.5,
                close,
                1000.0,
                base_time() + Duration::hours(i as i64),
            )
        })
        .collect()
}

/// Emits one opinion per window; the score depends on the instrument
pub struct StubStrategy {
    pub id: StrategyId,
    pub direction: Direction,
    pub scores: Vec<(&'static str, f64)>,
    pub default_score: f64,
}

impl StubStrategy {
    pub fn new(id: StrategyId, direction: Direction) -> Self {
        Self {
            id,
            direction,
            scores: Vec::new(),
            default_score: 0.6,
        }
    }

    pub fn with_score(mut self, symbol: &'static str, score: f64) -> Self {
        self.scores.push((symbol, score));
        self
    }
}

impl Strategy for StubStrategy {
    fn id(&self) -> StrategyId {
        self.id
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError> {
        let score = self
            .scores
            .iter()
            .find(|(symbol, _)| *symbol == window.symbol)
            .map(|(_, score)| *score)
            .unwrap_or(self.default_score);
        let price = window.candles[window.len() - 1].close;
        let levels = match self.direction {
            Direction::Buy => TradeLevels {
                target: price * 1.03,
                stop_loss: price * 0.985,
            },
            Direction::Short => TradeLevels {
                target: price * 0.97,
                stop_loss: price * 1.015,
            },
        };
        Ok(window.signal(self.id, self.direction, levels, score, format!("{} stub", self.id)))
    }
}

/// Panics for one instrument, abstains for the rest
pub struct PanicsOn(pub &'static str);

impl Strategy for PanicsOn {
    fn id(&self) -> StrategyId {
        StrategyId::ChannelBreakout
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn analyze(&self, window: &CandleWindow<'_>) -> Result<Option<RawSignal>, StrategyError> {
        if window.symbol == self.0 {
            panic!("corrupt state for {}", self.0);
        }
        Ok(None)
    }
}

/// Records every delivered signal
#[derive(Default)]
pub struct RecordingSink {
    pub delivered: Mutex<Vec<CompositeSignal>>,
}

#[async_trait]
impl SignalSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn publish(&self, signal: &CompositeSignal) -> Result<(), SinkError> {
        self.delivered.lock().await.push(signal.clone());
        Ok(())
    }
}

/// Fails the first `failures` deliveries
pub struct FlakySink {
    pub failures: usize,
    pub attempts: AtomicUsize,
}

impl FlakySink {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SignalSink for FlakySink {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn publish(&self, _signal: &CompositeSignal) -> Result<(), SinkError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(SinkError::Delivery(format!("attempt {} refused", attempt + 1)));
        }
        Ok(())
    }
}

/// Runtime wired around stub detectors, an in-memory provider and a manual clock
pub struct TestRuntime {
    pub runtime: SignalRuntime,
    pub provider: StaticMarketDataProvider,
    pub clock: Arc<ManualClock>,
}

pub fn build_runtime(
    strategies: Vec<Arc<dyn Strategy>>,
    max_signals_per_cycle: usize,
    sinks: Vec<Arc<dyn SignalSink>>,
) -> TestRuntime {
    let provider = StaticMarketDataProvider::new();
    let clock = Arc::new(ManualClock::new(base_time() + Duration::days(2)));
    let engine = SignalEngine::new(StrategyRegistry::with_strategies(strategies), Aggregator::default());
    let cooldown = CooldownTracker::new(Duration::minutes(60), clock.clone());
    let config = RuntimeConfig {
        timeframes: vec!["1h".to_string(), "4h".to_string()],
        max_concurrency: 3,
        max_signals_per_cycle,
    };

    let shared_provider: Arc<dyn MarketDataProvider> = Arc::new(provider.clone());
    let shared_clock: Arc<dyn Clock> = clock.clone();
    let mut runtime = SignalRuntime::new(config, Arc::new(engine), shared_provider, Arc::new(cooldown), shared_clock);
    for sink in sinks {
        runtime = runtime.with_sink(sink);
    }

    TestRuntime {
        runtime,
        provider,
        clock,
    }
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
