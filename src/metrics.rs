//! Prometheus counters for the scan loop

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub cycles_total: IntCounter,
    pub instruments_scanned_total: IntCounter,
    pub instrument_failures_total: IntCounter,
    pub strategy_failures_total: IntCounter,
    pub raw_signals_total: IntCounter,
    pub composite_signals_total: IntCounter,
    pub signals_published_total: IntCounter,
    pub signals_suppressed_total: IntCounter,
    pub cycle_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| -> Result<IntCounter, prometheus::Error> {
            let counter = IntCounter::new(name, help)?;
            registry.register(Box::new(counter.clone()))?;
            Ok(counter)
        };

        let cycles_total = counter("cycles_total", "Completed scan cycles")?;
        let instruments_scanned_total = counter("instruments_scanned_total", "Instruments evaluated")?;
        let instrument_failures_total =
            counter("instrument_failures_total", "Instruments that yielded no result due to an error")?;
        let strategy_failures_total =
            counter("strategy_failures_total", "Strategy evaluations that errored or panicked")?;
        let raw_signals_total = counter("raw_signals_total", "Raw detections emitted by strategies")?;
        let composite_signals_total =
            counter("composite_signals_total", "Composite signals passing the confluence threshold")?;
        let signals_published_total = counter("signals_published_total", "Signals delivered to sinks")?;
        let signals_suppressed_total =
            counter("signals_suppressed_total", "Signals held back by the cooldown")?;

        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("cycle_duration_seconds", "Wall time of one scan cycle")
                .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        )?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            cycles_total,
            instruments_scanned_total,
            instrument_failures_total,
            strategy_failures_total,
            raw_signals_total,
            composite_signals_total,
            signals_published_total,
            signals_suppressed_total,
            cycle_duration_seconds,
        })
    }

    /// Text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
