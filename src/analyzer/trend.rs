// Bullish/bearish point scoring for non-tangled markets.
use super::tangle::{MaSlopes, MaValues, TangleDiagnostic};
use crate::utils::fmt_opt;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TREND_MIN_SCORE: u8 = 3;
pub const STRONG_TREND_SCORE: u8 = 5;
pub const MA20_SLOPE_THRESHOLD: f64 = 0.3;
pub const MA5_SLOPE_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendType {
    #[serde(rename = "多頭")]
    Bullish,
    #[serde(rename = "空頭")]
    Bearish,
    #[serde(rename = "震盪")]
    Ranging,
    #[serde(rename = "糾結")]
    Tangled,
}

impl TrendType {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendType::Bullish => "多頭",
            TrendType::Bearish => "空頭",
            TrendType::Ranging => "震盪",
            TrendType::Tangled => "糾結",
        }
    }
}

impl fmt::Display for TrendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendStrength {
    Strong,
    Normal,
}

impl TrendStrength {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendStrength::Strong => "強勢",
            TrendStrength::Normal => "一般",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrendScore {
    pub bullish: u8,
    pub bearish: u8,
}

impl TrendScore {
    /// Undefined averages contribute no point to either side.
    pub fn compute(mas: &MaValues, close: f64, slopes: &MaSlopes) -> Self {
        let mut score = Self::default();

        for pair in [(mas.ma5, mas.ma10), (mas.ma10, mas.ma20)] {
            if let (Some(short), Some(long)) = pair {
                if short > long {
                    score.bullish += 1;
                } else {
                    score.bearish += 1;
                }
            }
        }

        if let Some(ma20) = mas.ma20 {
            if close > ma20 {
                score.bullish += 2;
            } else if close < ma20 {
                score.bearish += 2;
            }
        }

        for (slope, threshold) in [(slopes.ma20, MA20_SLOPE_THRESHOLD), (slopes.ma5, MA5_SLOPE_THRESHOLD)] {
            match slope {
                Some(s) if s > threshold => score.bullish += 1,
                Some(s) if s < -threshold => score.bearish += 1,
                _ => {}
            }
        }

        score
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendVerdict {
    pub trend_type: TrendType,
    pub strength: Option<TrendStrength>,
    pub score: Option<TrendScore>,
    pub description: String,
}

/// Tangle short-circuits the score; otherwise bullish wins ties at the threshold.
pub fn classify(tangle: &TangleDiagnostic, mas: &MaValues, close: f64) -> TrendVerdict {
    if tangle.is_tangled {
        return TrendVerdict {
            trend_type: TrendType::Tangled,
            strength: None,
            score: None,
            description: format!("均線糾結，{}", tangle.reason),
        };
    }

    let score = TrendScore::compute(mas, close, &tangle.slopes);
    let strength = |points: u8, beyond_ma120: bool| {
        if points >= STRONG_TREND_SCORE && beyond_ma120 {
            TrendStrength::Strong
        } else {
            TrendStrength::Normal
        }
    };

    if score.bullish >= TREND_MIN_SCORE {
        let strength = strength(score.bullish, mas.ma120.is_some_and(|m| close > m));
        TrendVerdict {
            trend_type: TrendType::Bullish,
            strength: Some(strength),
            score: Some(score),
            description: format!("多頭排列，趨勢偏多({})", strength.as_str()),
        }
    } else if score.bearish >= TREND_MIN_SCORE {
        let strength = strength(score.bearish, mas.ma120.is_some_and(|m| close < m));
        TrendVerdict {
            trend_type: TrendType::Bearish,
            strength: Some(strength),
            score: Some(score),
            description: format!("空頭排列，趨勢偏空({})", strength.as_str()),
        }
    } else {
        TrendVerdict {
            trend_type: TrendType::Ranging,
            strength: None,
            score: Some(score),
            description: format!(
                "震盪整理(收斂度{}%，多空{}:{})",
                fmt_opt(tangle.convergence_ratio, 2),
                score.bullish,
                score.bearish
            ),
        }
    }
}
