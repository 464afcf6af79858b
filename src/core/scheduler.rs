//! Cron-based scheduler running one scan cycle per tick

use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::core::runtime::SignalRuntime;
use crate::error::EngineError;
use crate::services::market_data::MarketDataProvider;

/// Where each cycle's instrument list comes from
#[derive(Debug, Clone)]
pub enum SymbolSource {
    Fixed(Vec<String>),
    /// Ask the provider on every tick
    Provider,
}

pub struct CycleScheduler {
    runtime: Arc<SignalRuntime>,
    provider: Arc<dyn MarketDataProvider>,
    symbols: SymbolSource,
    schedule: Schedule,
    cron_expr: String,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

/// Cron expression (seconds field first) firing every `interval_minutes`
pub fn cron_expression(interval_minutes: u64) -> Result<String, EngineError> {
    match interval_minutes {
        0 => Err(EngineError::Scheduler(
            "scheduler disabled: interval_minutes is 0".to_string(),
        )),
        // Step fields restart at each hour (or day), so only divisors tick evenly
        m if m < 60 && 60 % m == 0 => Ok(format!("0 */{} * * * *", m)),
        m if m % 60 == 0 && m < 24 * 60 && 24 % (m / 60) == 0 => {
            Ok(format!("0 0 */{} * * *", m / 60))
        }
        m => Err(EngineError::Scheduler(format!(
            "unsupported cycle interval of {} minutes (use a divisor of 60, or whole hours dividing 24)",
            m
        ))),
    }
}

impl CycleScheduler {
    pub fn new(
        runtime: Arc<SignalRuntime>,
        provider: Arc<dyn MarketDataProvider>,
        symbols: SymbolSource,
        interval_minutes: u64,
    ) -> Result<Self, EngineError> {
        let cron_expr = cron_expression(interval_minutes)?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| {
            EngineError::Scheduler(format!("invalid cron expression '{}': {}", cron_expr, e))
        })?;

        info!(
            interval_minutes,
            cron = %cron_expr,
            "CycleScheduler: created"
        );

        Ok(Self {
            runtime,
            provider,
            symbols,
            schedule,
            cron_expr,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn cron_expr(&self) -> &str {
        &self.cron_expr
    }

    pub async fn start(&self) {
        let mut guard = self.handle.write().await;
        if guard.is_some() {
            return;
        }

        let runtime = self.runtime.clone();
        let provider = self.provider.clone();
        let symbols = self.symbols.clone();
        let schedule = self.schedule.clone();

        *guard = Some(tokio::spawn(async move {
            info!("CycleScheduler: started, waiting for cron schedule...");
            loop {
                let Some(next_tick) = schedule.upcoming(chrono::Utc).next() else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                };
                let now = chrono::Utc::now();
                if next_tick > now {
                    let wait = (next_tick - now).to_std().unwrap_or_default();
                    tokio::time::sleep(wait).await;
                }

                let universe = match &symbols {
                    SymbolSource::Fixed(list) => list.clone(),
                    SymbolSource::Provider => match provider.list_symbols().await {
                        Ok(list) => list,
                        Err(e) => {
                            error!(error = %e, "CycleScheduler: failed to list symbols, skipping tick");
                            continue;
                        }
                    },
                };

                info!(symbol_count = universe.len(), "CycleScheduler: cron tick");
                runtime.run_cycle(&universe).await;
            }
        }));
        info!("CycleScheduler: started successfully");
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.handle.write().await.take() {
            handle.abort();
            info!("CycleScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
