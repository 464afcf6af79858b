//! Engine configuration: defaults, then an optional JSON file, then the
//! environment (`.env` honoured).

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::core::scheduler::cron_expression;
use crate::error::ConfigError;
use crate::models::strategy::{StrategyId, StrategyParams};
use crate::signals::aggregation::{AggregationConfig, ConfluenceVoting};

/// Get the current environment (development, sandbox, production)
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timeframes: Vec<String>,
    pub min_confluence: usize,
    pub mtf_bonus: f64,
    pub voting: ConfluenceVoting,
    pub cooldown_minutes: i64,
    pub max_concurrency: usize,
    pub max_signals_per_cycle: usize,
    pub cycle_interval_minutes: u64,
    /// Timeframe tables shorter than this are not analysed at all
    pub min_candles: usize,
    pub strategies: Vec<StrategyId>,
    pub params: StrategyParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeframes: ["15m", "1h", "4h", "1d"].iter().map(|s| s.to_string()).collect(),
            min_confluence: 2,
            mtf_bonus: 0.10,
            voting: ConfluenceVoting::PerSignal,
            cooldown_minutes: 60,
            max_concurrency: 20,
            max_signals_per_cycle: 50,
            cycle_interval_minutes: 5,
            min_candles: 30,
            strategies: StrategyId::ALL.to_vec(),
            params: StrategyParams::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults, overlaid by `path` when given, overlaid by the process
    /// environment. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Any subset of fields; missing ones keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Apply the recognised environment variables through `lookup`
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = lookup("MIN_CONFLUENCE_SCORE") {
            self.min_confluence = parse_env("MIN_CONFLUENCE_SCORE", &v)?;
        }
        if let Some(v) = lookup("SIGNAL_COOLDOWN_MINUTES") {
            self.cooldown_minutes = parse_env("SIGNAL_COOLDOWN_MINUTES", &v)?;
        }
        if let Some(v) = lookup("MAX_CONCURRENT_REQUESTS") {
            self.max_concurrency = parse_env("MAX_CONCURRENT_REQUESTS", &v)?;
        }
        if let Some(v) = lookup("MAX_SIGNALS_PER_CYCLE") {
            self.max_signals_per_cycle = parse_env("MAX_SIGNALS_PER_CYCLE", &v)?;
        }
        if let Some(v) = lookup("CYCLE_INTERVAL_MINUTES") {
            self.cycle_interval_minutes = parse_env("CYCLE_INTERVAL_MINUTES", &v)?;
        }
        if let Some(v) = lookup("TIMEFRAMES") {
            self.timeframes = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    pub fn aggregation(&self) -> AggregationConfig {
        AggregationConfig {
            min_confluence: self.min_confluence,
            mtf_bonus: self.mtf_bonus,
            voting: self.voting,
        }
    }

    pub fn cooldown(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::try_minutes(self.cooldown_minutes).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "cooldown_minutes {} is out of range",
                self.cooldown_minutes
            ))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.min_confluence == 0 {
            return invalid("min_confluence must be at least 1");
        }
        if self.max_concurrency == 0 {
            return invalid("max_concurrency must be at least 1");
        }
        if self.cooldown_minutes < 0 {
            return invalid("cooldown_minutes must not be negative");
        }
        self.cooldown()?;
        if self.timeframes.is_empty() {
            return invalid("at least one timeframe is required");
        }
        if self.cycle_interval_minutes == 0 {
            return invalid("cycle_interval_minutes must be at least 1");
        }
        cron_expression(self.cycle_interval_minutes)
            .map_err(|e| ConfigError::Invalid(format!("cycle_interval_minutes: {}", e)))?;
        if !(0.0..=1.0).contains(&self.mtf_bonus) {
            return invalid("mtf_bonus must be within [0, 1]");
        }

        let p = &self.params;
        if !positive(p.risk.risk_reward_ratio) {
            return invalid("risk_reward_ratio must be positive");
        }
        if !positive(p.risk.stop_loss_percent) || !positive(p.risk.atr_multiplier) {
            return invalid("stop_loss_percent and atr_multiplier must be positive");
        }

        let periods = [
            ("risk.atr_period", p.risk.atr_period),
            ("rsi_stoch.rsi_period", p.rsi_stoch.rsi_period),
            ("rsi_stoch.stoch_period", p.rsi_stoch.stoch_period),
            ("rsi_stoch.k_smoothing", p.rsi_stoch.k_smoothing),
            ("rsi_stoch.d_smoothing", p.rsi_stoch.d_smoothing),
            ("bollinger.period", p.bollinger.period),
            ("bollinger.squeeze_lookback", p.bollinger.squeeze_lookback),
            ("bollinger.confirm_bars", p.bollinger.confirm_bars),
            ("rsi_divergence.rsi_period", p.rsi_divergence.rsi_period),
            ("rsi_divergence.divergence_lookback", p.rsi_divergence.divergence_lookback),
            ("rsi_divergence.swing_window", p.rsi_divergence.swing_window),
            ("volume_confirm.volume_period", p.volume_confirm.volume_period),
            ("volume_confirm.percentile_window", p.volume_confirm.percentile_window),
            ("channel_breakout.lookback_period", p.channel_breakout.lookback_period),
            ("ema_cross.fast_period", p.ema_cross.fast_period),
            ("ema_cross.slow_period", p.ema_cross.slow_period),
            ("ema_cross.adx_period", p.ema_cross.adx_period),
            ("level_breakout.swing_lookback", p.level_breakout.swing_lookback),
            ("level_breakout.swing_window", p.level_breakout.swing_window),
            ("level_breakout.volume_period", p.level_breakout.volume_period),
            ("macd_cross.fast_period", p.macd_cross.fast_period),
            ("macd_cross.slow_period", p.macd_cross.slow_period),
            ("macd_cross.signal_period", p.macd_cross.signal_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, period)| *period == 0) {
            return Err(ConfigError::Invalid(format!("{} must be at least 1", name)));
        }

        let thresholds = [
            ("rsi_stoch.oversold", p.rsi_stoch.oversold),
            ("rsi_stoch.overbought", p.rsi_stoch.overbought),
            ("rsi_stoch.extreme_oversold", p.rsi_stoch.extreme_oversold),
            ("rsi_stoch.extreme_overbought", p.rsi_stoch.extreme_overbought),
            ("rsi_stoch.stoch_oversold", p.rsi_stoch.stoch_oversold),
            ("rsi_stoch.stoch_overbought", p.rsi_stoch.stoch_overbought),
            ("rsi_divergence.rsi_oversold", p.rsi_divergence.rsi_oversold),
            ("rsi_divergence.rsi_overbought", p.rsi_divergence.rsi_overbought),
            ("ema_cross.min_adx", p.ema_cross.min_adx),
        ];
        if let Some((name, _)) = thresholds.iter().find(|(_, t)| !(0.0..=100.0).contains(t)) {
            return Err(ConfigError::Invalid(format!("{} must be within [0, 100]", name)));
        }
        let rs = &p.rsi_stoch;
        if rs.oversold <= 0.0
            || rs.overbought >= 100.0
            || rs.stoch_oversold <= 0.0
            || rs.stoch_overbought >= 100.0
        {
            return invalid("rsi_stoch oversold/overbought levels must lie strictly inside (0, 100)");
        }

        let vc = &p.volume_confirm;
        if !(0.0..=1.0).contains(&vc.bottom_percentile)
            || !(0.0..=1.0).contains(&vc.top_percentile)
            || vc.bottom_percentile >= vc.top_percentile
        {
            return invalid("volume_confirm percentiles must satisfy 0 <= bottom < top <= 1");
        }
        if !(vc.min_move.is_finite() && vc.min_move >= 0.0) {
            return invalid("volume_confirm.min_move must not be negative");
        }

        if p.ema_cross.fast_period >= p.ema_cross.slow_period {
            return invalid("ema_cross.fast_period must be below slow_period");
        }
        if p.macd_cross.fast_period >= p.macd_cross.slow_period {
            return invalid("macd_cross.fast_period must be below slow_period");
        }
        if self.strategies.is_empty() {
            return invalid("at least one strategy must be enabled");
        }
        Ok(())
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key: key.to_string(),
        value: value.to_string(),
    })
}
