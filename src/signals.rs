//! Buy/sell signal selection.
//!
//! With two timeframes configured the short and primary trends are combined
//! through a fixed divergence matrix and only a clear agreement produces a
//! signal. With a single timeframe the 24h change threshold rule applies.

use crate::analyzer::TrendType;
use crate::config::SignalConfig;
use crate::report::{MarketReport, SymbolReport, TimeframeAnalysis};
use serde::{Serialize, Serializer};
use std::fmt;

/// Per-timeframe signal shown next to each trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn for_timeframe(analysis: &TimeframeAnalysis) -> Self {
        if analysis.is_tangled() {
            return Signal::Hold;
        }
        match analysis.trend_type() {
            TrendType::Bullish => Signal::Buy,
            TrendType::Bearish => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Signal::Buy => "🟢買入",
            Signal::Sell => "🔴賣出",
            Signal::Hold => "⚪觀望",
        }
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinedAdvice {
    ClearBullish,
    ClearBearish,
    DoubleRanging,
    DoubleTangled,
    CautiousBullish,
    CautiousBearish,
    Wait,
}

impl CombinedAdvice {
    /// Combines the short and primary timeframe trends.
    pub fn combine(short: TrendType, primary: TrendType) -> Self {
        use crate::analyzer::TrendType::*;
        match (short, primary) {
            (Bullish, Bullish) => CombinedAdvice::ClearBullish,
            (Bearish, Bearish) => CombinedAdvice::ClearBearish,
            (Ranging, Ranging) => CombinedAdvice::DoubleRanging,
            (Tangled, Tangled) => CombinedAdvice::DoubleTangled,
            (Bullish, Tangled) | (Tangled, Bullish) => CombinedAdvice::CautiousBullish,
            (Bearish, Tangled) | (Tangled, Bearish) => CombinedAdvice::CautiousBearish,
            _ => CombinedAdvice::Wait,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CombinedAdvice::ClearBullish => "明確看多",
            CombinedAdvice::ClearBearish => "明確看空",
            CombinedAdvice::DoubleRanging => "雙重震盪",
            CombinedAdvice::DoubleTangled => "雙重糾結",
            CombinedAdvice::CautiousBullish => "謹慎做多",
            CombinedAdvice::CautiousBearish => "謹慎做空",
            CombinedAdvice::Wait => "觀望等待",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            CombinedAdvice::ClearBullish => "🟢",
            CombinedAdvice::ClearBearish => "🔴",
            CombinedAdvice::DoubleRanging => "📊",
            CombinedAdvice::CautiousBullish | CombinedAdvice::CautiousBearish => "🟡",
            CombinedAdvice::DoubleTangled | CombinedAdvice::Wait => "⚪",
        }
    }

    /// Cautious tiers never produce a signal.
    pub fn side(self) -> Option<SignalSide> {
        match self {
            CombinedAdvice::ClearBullish => Some(SignalSide::Buy),
            CombinedAdvice::ClearBearish => Some(SignalSide::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for CombinedAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.emoji(), self.label())
    }
}

impl Serialize for CombinedAdvice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalSide {
    Buy,
    Sell,
}

impl SignalSide {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalSide::Buy => "buy",
            SignalSide::Sell => "sell",
        }
    }

    /// De-duplication key, `SYMBOL:side`.
    pub fn key(self, symbol: &str) -> String {
        format!("{symbol}:{}", self.as_str())
    }
}

/// Picks the signal side for one symbol, if any.
pub fn select_side(report: &SymbolReport, config: &SignalConfig) -> Option<SignalSide> {
    if let Some(advice) = report.combined_advice {
        return advice.side();
    }

    let result = report.primary()?.result()?;
    match result.trend_type {
        TrendType::Bullish if result.change_24h_percent > config.buy_signal_threshold => Some(SignalSide::Buy),
        TrendType::Bearish if result.change_24h_percent < config.sell_signal_threshold => Some(SignalSide::Sell),
        _ => None,
    }
}

/// Symbols grouped by selected signal, in report order.
#[derive(Debug, Default)]
pub struct SignalBatch<'a> {
    pub buy: Vec<&'a SymbolReport>,
    pub sell: Vec<&'a SymbolReport>,
    pub neutral: Vec<&'a SymbolReport>,
}

impl SignalBatch<'_> {
    pub fn side_of(&self, symbol: &str) -> Option<SignalSide> {
        if self.buy.iter().any(|r| r.symbol == symbol) {
            Some(SignalSide::Buy)
        } else if self.sell.iter().any(|r| r.symbol == symbol) {
            Some(SignalSide::Sell)
        } else {
            None
        }
    }
}

pub fn partition<'a>(report: &'a MarketReport, config: &SignalConfig) -> SignalBatch<'a> {
    let mut batch = SignalBatch::default();
    for symbol_report in report.reports() {
        match select_side(symbol_report, config) {
            Some(SignalSide::Buy) => batch.buy.push(symbol_report),
            Some(SignalSide::Sell) => batch.sell.push(symbol_report),
            None => batch.neutral.push(symbol_report),
        }
    }
    batch
}
