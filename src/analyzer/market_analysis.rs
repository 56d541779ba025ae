use super::narrative::{self, IndicatorSummary, LatestValues, NarrativeInput};
use super::pivots::FibonacciPivots;
use super::suggestion::{self, TradeSuggestion};
use super::tangle::{self, MaSlopes, MaValues};
use super::trend::{self, TrendType};
use crate::config::AnalysisConfig;
use crate::indicators::Series;
use crate::model::{AnalysisError, Candle, TickerSnapshot};
use crate::utils::pct_change;
use serde::{Deserialize, Serialize};

/// Tangle diagnostic and the moving averages it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaAnalysis {
    pub convergence_ratio: Option<f64>,
    pub is_tangled: bool,
    pub tangled_reason: String,
    pub tangled_score: u8,
    pub ma5_slope: Option<f64>,
    pub ma10_slope: Option<f64>,
    pub ma20_slope: Option<f64>,
    pub ma_values: MaValues,
}

/// Full analysis of one symbol on one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub current_price: f64,
    #[serde(rename = "24hr_change_percent")]
    pub change_24h_percent: f64,
    #[serde(rename = "1h_change_percent")]
    pub change_1h_percent: f64,
    #[serde(rename = "4h_change_percent")]
    pub change_4h_percent: f64,
    #[serde(rename = "24hr_volume")]
    pub volume_24h: f64,
    pub fibonacci_pivots: FibonacciPivots,
    pub major_support: f64,
    pub major_resistance: f64,
    pub current_trend: String,
    pub trend_type: TrendType,
    pub ma_analysis: MaAnalysis,
    pub technical_indicators_summary: IndicatorSummary,
    pub analysis_result: TradeSuggestion,
}

/// Interface for turning a candle series plus ticker into an [`AnalysisResult`].
pub trait Analyzer {
    fn analyze(&self, candles: Vec<Candle>, ticker: &TickerSnapshot) -> Result<AnalysisResult, AnalysisError>;
    fn analyze_series(&self, series: &Series, ticker: &TickerSnapshot) -> Result<AnalysisResult, AnalysisError>;
}

/// Stateless analyzer; identical input always yields an identical result.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: AnalysisConfig,
}

impl TrendAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl Analyzer for TrendAnalyzer {
    fn analyze(&self, candles: Vec<Candle>, ticker: &TickerSnapshot) -> Result<AnalysisResult, AnalysisError> {
        let series = Series::new(candles, &self.config);
        self.analyze_series(&series, ticker)
    }

    fn analyze_series(&self, series: &Series, ticker: &TickerSnapshot) -> Result<AnalysisResult, AnalysisError> {
        let last = series.last_candle().ok_or(AnalysisError::EmptySeries)?;
        let close = last.close;
        let current_price = ticker.last_price;

        let change_since = |back: usize| {
            series
                .close_back(back)
                .map(|then| pct_change(then, current_price))
                .unwrap_or(0.0)
        };

        let (high, low) = series
            .recent_range(self.config.pivot_window)
            .unwrap_or((last.high, last.low));
        let pivots = FibonacciPivots::calculate(high, low, close);

        let mas = MaValues::at_back(series, 0);
        let slopes = MaSlopes::measure(series);
        let diagnostic = tangle::detect(&mas, slopes, close);
        let verdict = trend::classify(&diagnostic, &mas, close);

        let values = LatestValues::from_series(series);
        let summary = narrative::summarize(&NarrativeInput {
            values: &values,
            mas: &mas,
            tangle: &diagnostic,
            verdict: &verdict,
            include_dmi: self.config.enable_dmi,
        });
        let advice = suggestion::suggest(verdict.trend_type, current_price, mas.ma20, &pivots);

        Ok(AnalysisResult {
            current_price,
            change_24h_percent: ticker.price_change_percent,
            change_1h_percent: change_since(1),
            change_4h_percent: change_since(4),
            volume_24h: ticker.volume,
            fibonacci_pivots: pivots,
            major_support: pivots.major_support(),
            major_resistance: pivots.major_resistance(),
            current_trend: verdict.description,
            trend_type: verdict.trend_type,
            ma_analysis: MaAnalysis {
                convergence_ratio: diagnostic.convergence_ratio,
                is_tangled: diagnostic.is_tangled,
                tangled_reason: diagnostic.reason,
                tangled_score: diagnostic.score,
                ma5_slope: slopes.ma5,
                ma10_slope: slopes.ma10,
                ma20_slope: slopes.ma20,
                ma_values: mas,
            },
            technical_indicators_summary: summary,
            analysis_result: advice,
        })
    }
}
