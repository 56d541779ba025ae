// Analyzer module: trend/tangle classification over an indicator series.

pub mod market_analysis;
pub mod narrative;
pub mod pivots;
pub mod suggestion;
pub mod tangle;
pub mod trend;

// Re-export the main Analyzer implementation for ease of use.
pub use market_analysis::{AnalysisResult, Analyzer, MaAnalysis, TrendAnalyzer};
pub use trend::TrendType;
