// Core structs: Candle, TickerSnapshot, KlineRequest and the error types
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One OHLCV bar. Series are ordered by `open_time` ascending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Point-in-time 24h ticker, supplied independently of the candles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub last_price: f64,
    pub price_change_percent: f64,
    pub volume: f64,
}

#[derive(Debug, Clone)]
pub struct KlineRequest {
    pub symbol: String,
    pub interval: String,
    pub limit: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    InvalidResponse(u16),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("invalid number in {field}: {value:?}")]
    InvalidNumber { field: String, value: String },
}

/// Failure to obtain usable market data for a symbol.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParserError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("candle series is empty")]
    EmptySeries,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("telegram api error: {0}")]
    ApiError(String),
    #[error("telegram unreachable")]
    Unreachable,
}
