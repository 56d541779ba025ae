use crate::model::ConfigError;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fs;

pub const MAX_KLINE_LIMIT: u32 = 1000;
/// One year.
pub const MAX_COOLDOWN_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Computes DI+/DI-/ADX and adds the DMI narrative.
    pub enable_dmi: bool,
    /// Trailing candles used for the Fibonacci pivot high/low.
    pub pivot_window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enable_dmi: true,
            pivot_window: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub send_buy_signals: bool,
    pub send_sell_signals: bool,
    pub send_market_summary: bool,
    /// 24h change (%) a bullish symbol must exceed in single-timeframe mode.
    pub buy_signal_threshold: f64,
    /// 24h change (%) a bearish symbol must fall below in single-timeframe mode.
    pub sell_signal_threshold: f64,
    pub message_interval_ms: u64,
    pub notify_cooldown_hours: i64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            send_buy_signals: true,
            send_sell_signals: true,
            send_market_summary: true,
            buy_signal_threshold: 1.0,
            sell_signal_threshold: -1.0,
            message_interval_ms: 1000,
            notify_cooldown_hours: 4,
        }
    }
}

impl SignalConfig {
    /// Cooldown between repeated signals, clamped to `0..=MAX_COOLDOWN_HOURS`.
    pub fn cooldown(&self) -> TimeDelta {
        let hours = self.notify_cooldown_hours.clamp(0, MAX_COOLDOWN_HOURS);
        TimeDelta::try_hours(hours).unwrap_or_else(TimeDelta::zero)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub telegram_chat_id: i64,
    pub symbols: Vec<String>,
    /// First entry is the primary timeframe; the second (if any) is the short one.
    pub intervals: Vec<String>,
    pub kline_limit: u32,
    /// 0 runs a single pass and exits.
    pub check_interval_seconds: u64,
    pub api_base_url: String,
    pub report_path: String,
    pub database_path: String,
    pub analysis: AnalysisConfig,
    pub signals: SignalConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: String::new(),
            telegram_chat_id: 0,
            symbols: ["BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            intervals: vec!["1h".into(), "15m".into()],
            kline_limit: 500,
            check_interval_seconds: 3600,
            api_base_url: "https://data-api.binance.vision/api/v3".into(),
            report_path: "data/multi_investment_report.json".into(),
            database_path: "data.db".into(),
            analysis: AnalysisConfig::default(),
            signals: SignalConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn primary_interval(&self) -> Option<&str> {
        self.intervals.first().map(String::as_str)
    }

    pub fn short_interval(&self) -> Option<&str> {
        self.intervals.get(1).map(String::as_str)
    }

    pub fn telegram_enabled(&self) -> bool {
        !self.telegram_bot_token.is_empty() && self.telegram_chat_id != 0
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            self.telegram_bot_token = token;
        }
        if let Ok(chat_id) = std::env::var("TELEGRAM_CHAT_ID") {
            self.telegram_chat_id = chat_id
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("TELEGRAM_CHAT_ID={chat_id}")))?;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.intervals.is_empty() {
            return Err(ConfigError::Invalid("intervals must not be empty".into()));
        }
        if self.kline_limit == 0 {
            return Err(ConfigError::Invalid("kline_limit must be positive".into()));
        }
        self.kline_limit = self.kline_limit.min(MAX_KLINE_LIMIT);
        if !(0..=MAX_COOLDOWN_HOURS).contains(&self.signals.notify_cooldown_hours) {
            return Err(ConfigError::Invalid(format!(
                "notify_cooldown_hours must be within 0..={MAX_COOLDOWN_HOURS}"
            )));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    config.apply_env_overrides()?;
    Ok(config)
}
