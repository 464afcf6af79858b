//! Confluence scanner
//!
//! Scans instruments from a candle data directory, either once or on a cron
//! schedule, and logs every composite signal that clears the cooldown.

use anyhow::{bail, Context, Result};
use clap::Parser;
use confluence::config::{get_environment, EngineConfig};
use confluence::core::clock::SystemClock;
use confluence::core::runtime::SignalRuntime;
use confluence::core::scheduler::{CycleScheduler, SymbolSource};
use confluence::logging;
use confluence::metrics::Metrics;
use confluence::services::{JsonFileProvider, LogSink, MarketDataProvider, MemorySignalStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[derive(Parser)]
#[command(name = "confluence-scanner", about = "Multi-strategy confluence signal scanner")]
struct Cli {
    /// Symbols to scan. Defaults to every symbol found in the data directory.
    symbols: Vec<String>,

    /// Scan a single symbol (overrides positional symbols).
    #[arg(long)]
    symbol: Option<String>,

    /// Run one cycle and exit.
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Directory with `<SYMBOL>/<timeframe>.json` candle files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// JSON config file; environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    logging::init_logging();
    info!(environment = %get_environment(), "Starting confluence scanner");

    let metrics = Arc::new(Metrics::new()?);
    let provider: Arc<dyn MarketDataProvider> = Arc::new(JsonFileProvider::new(&cli.data_dir));
    let store = MemorySignalStore::new();
    let runtime = Arc::new(
        SignalRuntime::from_config(&config, provider.clone(), Arc::new(SystemClock), Some(metrics.clone()))?
            .with_sink(Arc::new(LogSink))
            .with_sink(Arc::new(store.clone())),
    );

    let symbols = match (cli.symbol, cli.symbols.is_empty()) {
        (Some(symbol), _) => SymbolSource::Fixed(vec![symbol]),
        (None, false) => SymbolSource::Fixed(cli.symbols),
        (None, true) => SymbolSource::Provider,
    };

    if cli.once {
        let universe = match &symbols {
            SymbolSource::Fixed(list) => list.clone(),
            SymbolSource::Provider => provider
                .list_symbols()
                .await
                .with_context(|| format!("failed to list symbols in {}", cli.data_dir.display()))?,
        };
        if universe.is_empty() {
            bail!("no symbols to scan in {}", cli.data_dir.display());
        }

        let report = runtime.run_cycle(&universe).await;
        let stats = store.stats().await;
        info!(
            published = report.published.len(),
            stored = stats.total_signals,
            "Single cycle finished"
        );
        return Ok(());
    }

    let scheduler = CycleScheduler::new(runtime, provider, symbols, config.cycle_interval_minutes)?;
    scheduler.start().await;

    info!(cron = %scheduler.cron_expr(), "Scanner started, waiting for shutdown signal...");
    signal::ctrl_c().await?;
    info!("Shutting down scanner...");
    scheduler.stop().await;
    info!(metrics = %metrics.render()?, "Scanner stopped");
    Ok(())
}
