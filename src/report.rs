//! Multi-symbol, multi-timeframe report.
//!
//! Each symbol carries one entry per interval. The primary interval's fields
//! are also copied to the symbol root so older readers of the report file
//! keep working.

use crate::analyzer::{AnalysisResult, Analyzer, TrendType};
use crate::fetcher::MarketFetcher;
use crate::model::{AnalysisError, KlineRequest, MarketDataError, ReportError, TickerSnapshot};
use crate::parser::BinanceParser;
use crate::signals::{CombinedAdvice, Signal};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const INSUFFICIENT_DATA: &str = "數據不足";
pub const ANALYSIS_FAILED: &str = "分析錯誤";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedMaAnalysis {
    pub is_tangled: bool,
}

/// Placeholder for a timeframe that could not be analyzed. Reads as tangled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedAnalysis {
    pub current_trend: String,
    pub trend_type: TrendType,
    pub ma_analysis: DegradedMaAnalysis,
}

impl DegradedAnalysis {
    fn with_reason(reason: &str) -> Self {
        Self {
            current_trend: reason.to_string(),
            trend_type: TrendType::Tangled,
            ma_analysis: DegradedMaAnalysis { is_tangled: true },
        }
    }

    pub fn insufficient_data() -> Self {
        Self::with_reason(INSUFFICIENT_DATA)
    }

    pub fn analysis_failed() -> Self {
        Self::with_reason(ANALYSIS_FAILED)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeframeAnalysis {
    Analyzed(Box<AnalysisResult>),
    Degraded(DegradedAnalysis),
}

impl TimeframeAnalysis {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            TimeframeAnalysis::Analyzed(result) => Some(result),
            TimeframeAnalysis::Degraded(_) => None,
        }
    }

    pub fn trend_type(&self) -> TrendType {
        match self {
            TimeframeAnalysis::Analyzed(result) => result.trend_type,
            TimeframeAnalysis::Degraded(d) => d.trend_type,
        }
    }

    pub fn is_tangled(&self) -> bool {
        match self {
            TimeframeAnalysis::Analyzed(result) => result.ma_analysis.is_tangled,
            TimeframeAnalysis::Degraded(d) => d.ma_analysis.is_tangled,
        }
    }

    pub fn current_trend(&self) -> &str {
        match self {
            TimeframeAnalysis::Analyzed(result) => &result.current_trend,
            TimeframeAnalysis::Degraded(d) => &d.current_trend,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolReport {
    pub symbol: String,
    pub primary_interval: String,
    pub short_interval: Option<String>,
    pub ticker: TickerSnapshot,
    pub combined_advice: Option<CombinedAdvice>,
    pub timeframes: BTreeMap<String, TimeframeAnalysis>,
}

impl SymbolReport {
    /// Combined advice is set only when a short interval is configured; a
    /// missing timeframe counts as tangled.
    pub fn new(
        symbol: &str,
        ticker: TickerSnapshot,
        primary_interval: &str,
        short_interval: Option<&str>,
        timeframes: BTreeMap<String, TimeframeAnalysis>,
    ) -> Self {
        let trend_of = |interval: &str| {
            timeframes
                .get(interval)
                .map(TimeframeAnalysis::trend_type)
                .unwrap_or(TrendType::Tangled)
        };
        let combined_advice = short_interval.map(|short| CombinedAdvice::combine(trend_of(short), trend_of(primary_interval)));

        Self {
            symbol: symbol.to_string(),
            primary_interval: primary_interval.to_string(),
            short_interval: short_interval.map(str::to_string),
            ticker,
            combined_advice,
            timeframes,
        }
    }

    pub fn primary(&self) -> Option<&TimeframeAnalysis> {
        self.timeframes.get(&self.primary_interval)
    }

    pub fn short(&self) -> Option<&TimeframeAnalysis> {
        self.short_interval.as_deref().and_then(|i| self.timeframes.get(i))
    }

    pub fn trend_type(&self) -> TrendType {
        self.primary().map(TimeframeAnalysis::trend_type).unwrap_or(TrendType::Tangled)
    }

    pub fn current_trend(&self) -> &str {
        self.primary().map(TimeframeAnalysis::current_trend).unwrap_or(INSUFFICIENT_DATA)
    }

    pub fn signal(&self, interval: &str) -> Signal {
        self.timeframes.get(interval).map(Signal::for_timeframe).unwrap_or(Signal::Hold)
    }

    /// `signal_<interval>` for every configured interval.
    pub fn signals(&self) -> BTreeMap<String, Signal> {
        self.timeframes
            .keys()
            .map(|interval| (format!("signal_{interval}"), self.signal(interval)))
            .collect()
    }
}

impl Serialize for SymbolReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Flat<'a> {
            symbol: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            combined_advice: Option<CombinedAdvice>,
            #[serde(flatten)]
            signals: BTreeMap<String, Signal>,
            #[serde(flatten)]
            timeframes: &'a BTreeMap<String, TimeframeAnalysis>,
            #[serde(flatten)]
            primary: Option<&'a TimeframeAnalysis>,
        }

        Flat {
            symbol: &self.symbol,
            combined_advice: self.combined_advice,
            signals: self.signals(),
            timeframes: &self.timeframes,
            primary: self.primary(),
        }
        .serialize(serializer)
    }
}

/// All symbol reports of one pass, in configured symbol order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketReport {
    reports: Vec<SymbolReport>,
}

impl MarketReport {
    pub fn new(reports: Vec<SymbolReport>) -> Self {
        Self { reports }
    }

    pub fn reports(&self) -> &[SymbolReport] {
        &self.reports
    }

    #[cfg(test)]
    pub fn get(&self, symbol: &str) -> Option<&SymbolReport> {
        self.reports.iter().find(|r| r.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for MarketReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.reports.iter().map(|r| (r.symbol.as_str(), r)))
    }
}

pub fn write_report(path: &str, report: &MarketReport) -> Result<(), ReportError> {
    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report.to_json_pretty()?)?;
    info!("Report saved: {} ({} symbols)", path.display(), report.len());
    Ok(())
}

/// Fetches the ticker and every interval for one symbol and analyzes them.
///
/// A ticker failure skips the symbol. A failing interval degrades to a
/// placeholder entry and the remaining intervals are still analyzed.
pub async fn build_symbol_report<F, A>(
    fetcher: &F,
    analyzer: &A,
    symbol: &str,
    intervals: &[String],
    limit: u32,
) -> Result<SymbolReport, MarketDataError>
where
    F: MarketFetcher + ?Sized,
    A: Analyzer + ?Sized,
{
    let ticker = BinanceParser::parse_ticker(&fetcher.fetch_ticker(symbol).await?)?;

    let mut timeframes = BTreeMap::new();
    for interval in intervals {
        let request = KlineRequest {
            symbol: symbol.to_string(),
            interval: interval.clone(),
            limit,
        };
        let analysis = analyze_timeframe(fetcher, analyzer, &request, &ticker).await;
        timeframes.insert(interval.clone(), analysis);
    }

    let primary = intervals.first().map(String::as_str).unwrap_or_default();
    let short = intervals.get(1).map(String::as_str);
    Ok(SymbolReport::new(symbol, ticker, primary, short, timeframes))
}

async fn analyze_timeframe<F, A>(
    fetcher: &F,
    analyzer: &A,
    request: &KlineRequest,
    ticker: &TickerSnapshot,
) -> TimeframeAnalysis
where
    F: MarketFetcher + ?Sized,
    A: Analyzer + ?Sized,
{
    let body = match fetcher.fetch_klines(request).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Kline fetch failed for {} {}: {}", request.symbol, request.interval, e);
            return TimeframeAnalysis::Degraded(DegradedAnalysis::insufficient_data());
        }
    };

    let candles = match BinanceParser::parse_klines(&body) {
        Ok(candles) => candles,
        Err(e) => {
            warn!("Kline parse failed for {} {}: {}", request.symbol, request.interval, e);
            return TimeframeAnalysis::Degraded(DegradedAnalysis::analysis_failed());
        }
    };

    match analyzer.analyze(candles, ticker) {
        Ok(result) => {
            info!(
                "{} {}: {} ({})",
                request.symbol, request.interval, result.trend_type, result.current_trend
            );
            TimeframeAnalysis::Analyzed(Box::new(result))
        }
        Err(AnalysisError::EmptySeries) => {
            warn!("No candles for {} {}", request.symbol, request.interval);
            TimeframeAnalysis::Degraded(DegradedAnalysis::insufficient_data())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::TrendAnalyzer;
    use crate::indicators::test_support::{candles_from_closes, linear};

    fn ticker() -> TickerSnapshot {
        TickerSnapshot {
            last_price: 150.0,
            price_change_percent: 5.0,
            volume: 1000.0,
        }
    }

    fn analyzed(closes: &[f64]) -> TimeframeAnalysis {
        let result = TrendAnalyzer::default()
            .analyze(candles_from_closes(closes, 1000.0), &ticker())
            .unwrap();
        TimeframeAnalysis::Analyzed(Box::new(result))
    }

    fn two_timeframes(primary: TimeframeAnalysis, short: TimeframeAnalysis) -> SymbolReport {
        let mut timeframes = BTreeMap::new();
        timeframes.insert("1h".to_string(), primary);
        timeframes.insert("15m".to_string(), short);
        SymbolReport::new("BTCUSDT", ticker(), "1h", Some("15m"), timeframes)
    }

    #[test]
    fn degraded_record_shape() {
        let json = serde_json::to_value(DegradedAnalysis::insufficient_data()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "current_trend": "數據不足",
                "trend_type": "糾結",
                "ma_analysis": {"is_tangled": true}
            })
        );
    }

    #[test]
    fn untagged_round_trip_keeps_variant() {
        let degraded = TimeframeAnalysis::Degraded(DegradedAnalysis::analysis_failed());
        let back: TimeframeAnalysis = serde_json::from_value(serde_json::to_value(&degraded).unwrap()).unwrap();
        assert_eq!(back, degraded);

        let rising = analyzed(&linear(130, 100.0, 150.0));
        let back: TimeframeAnalysis = serde_json::from_value(serde_json::to_value(&rising).unwrap()).unwrap();
        assert!(back.result().is_some());
    }

    #[test]
    fn primary_fields_are_copied_to_root() {
        let report = two_timeframes(
            analyzed(&linear(130, 100.0, 150.0)),
            TimeframeAnalysis::Degraded(DegradedAnalysis::insufficient_data()),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["symbol"], "BTCUSDT");
        assert_eq!(json["trend_type"], "多頭");
        assert_eq!(json["1h"]["trend_type"], "多頭");
        assert_eq!(json["15m"]["current_trend"], "數據不足");
        assert_eq!(json["current_price"], 150.0);
        assert_eq!(json["combined_advice"], "🟡謹慎做多");
        assert_eq!(json["signal_1h"], "🟢買入");
        assert_eq!(json["signal_15m"], "⚪觀望");
    }

    #[test]
    fn missing_short_timeframe_counts_as_tangled() {
        let mut timeframes = BTreeMap::new();
        timeframes.insert("1h".to_string(), analyzed(&linear(130, 100.0, 150.0)));
        let report = SymbolReport::new("ETHUSDT", ticker(), "1h", Some("15m"), timeframes);
        assert_eq!(report.combined_advice, Some(CombinedAdvice::CautiousBullish));
        assert_eq!(report.signal("15m"), Signal::Hold);
        assert_eq!(report.signal("1h"), Signal::Buy);
    }

    #[test]
    fn single_timeframe_has_no_combined_advice() {
        let mut timeframes = BTreeMap::new();
        timeframes.insert("1h".to_string(), analyzed(&linear(130, 100.0, 150.0)));
        let report = SymbolReport::new("SOLUSDT", ticker(), "1h", None, timeframes);
        assert_eq!(report.combined_advice, None);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("combined_advice").is_none());
    }

    #[test]
    fn market_report_keeps_symbol_order() {
        let make = |symbol: &str| {
            let mut timeframes = BTreeMap::new();
            timeframes.insert("1h".to_string(), TimeframeAnalysis::Degraded(DegradedAnalysis::insufficient_data()));
            SymbolReport::new(symbol, ticker(), "1h", None, timeframes)
        };
        let report = MarketReport::new(vec![make("XRPUSDT"), make("BTCUSDT")]);
        let text = report.to_json_pretty().unwrap();
        let xrp = text.find("\"XRPUSDT\"").unwrap();
        let btc = text.find("\"BTCUSDT\"").unwrap();
        assert!(xrp < btc);
        assert_eq!(report.get("BTCUSDT").map(|r| r.trend_type()), Some(TrendType::Tangled));
    }
}
