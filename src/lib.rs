//! Kline indicator and trend/tangle classification engine for crypto markets.
//!
//! The pure core lives in [`indicators`] and [`analyzer`]. Everything else
//! wraps it into a polling service: Binance fetch and parse, multi-timeframe
//! reports, signal selection, SQLite state and Telegram delivery.

pub mod analyzer;
pub mod config;
pub mod fetcher;
pub mod indicators;
pub mod model;
pub mod normalizer;
pub mod notifier;
pub mod parser;
pub mod report;
pub mod signals;
pub mod storage;
pub mod utils;
