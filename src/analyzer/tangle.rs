//! Moving-average tangle (consolidation) detection.
//!
//! Scores how interwoven MA5/MA10/MA20 are at the last row. A score of
//! [`TANGLE_THRESHOLD`] or more marks the market as tangled, which overrides
//! any score-based trend.

use crate::indicators::{Field, Series};
use crate::indicators::window::finite;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

pub const TANGLE_THRESHOLD: u8 = 4;
pub const EXTREME_CONVERGENCE: f64 = 0.5;
pub const DENSE_CONVERGENCE: f64 = 0.8;
pub const DIVERGENCE_MAX_CONVERGENCE: f64 = 2.0;
pub const CROSSING_MAX_CONVERGENCE: f64 = 1.5;
pub const SLOPE_DEAD_BAND: f64 = 0.2;
pub const FLAT_SLOPE: f64 = 0.1;
/// Slopes compare the last row against the row at index -5.
pub const SLOPE_LOOKBACK: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MaValues {
    #[serde(rename = "MA5")]
    pub ma5: Option<f64>,
    #[serde(rename = "MA10")]
    pub ma10: Option<f64>,
    #[serde(rename = "MA20")]
    pub ma20: Option<f64>,
    #[serde(rename = "MA120")]
    pub ma120: Option<f64>,
}

impl MaValues {
    pub fn at_back(series: &Series, back: usize) -> Self {
        let set = series.indicators();
        Self {
            ma5: set.back(Field::Ma5, back),
            ma10: set.back(Field::Ma10, back),
            ma20: set.back(Field::Ma20, back),
            ma120: set.back(Field::Ma120, back),
        }
    }

    fn short_three(&self) -> Option<[f64; 3]> {
        Some([self.ma5?, self.ma10?, self.ma20?])
    }

    /// `100 * (max - min) / mean` of MA5/MA10/MA20.
    pub fn convergence_ratio(&self) -> Option<f64> {
        let mas = self.short_three()?;
        let (min, max) = min_max(&mas);
        let mean = mas.iter().sum::<f64>() / 3.0;
        finite((max - min) / mean * 100.0)
    }

    pub fn contains(&self, price: f64) -> bool {
        self.short_three().is_some_and(|mas| {
            let (min, max) = min_max(&mas);
            (min..=max).contains(&price)
        })
    }
}

fn min_max(values: &[f64; 3]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Percentage change of each short MA versus [`SLOPE_LOOKBACK`] rows earlier.
/// A slope is undefined while either endpoint is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MaSlopes {
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
}

impl MaSlopes {
    pub fn measure(series: &Series) -> Self {
        if series.len() <= SLOPE_LOOKBACK {
            return Self::default();
        }
        let set = series.indicators();
        let slope = |field: Field| -> Option<f64> {
            let now = set.last(field)?;
            let then = set.back(field, SLOPE_LOOKBACK)?;
            finite((now - then) / then * 100.0)
        };
        Self {
            ma5: slope(Field::Ma5),
            ma10: slope(Field::Ma10),
            ma20: slope(Field::Ma20),
        }
    }

    fn all(&self) -> [Option<f64>; 3] {
        [self.ma5, self.ma10, self.ma20]
    }

    /// Distinct non-zero slope directions, with a ±[`SLOPE_DEAD_BAND`] dead band.
    /// Undefined slopes have no direction.
    pub fn distinct_directions(&self) -> usize {
        self.all()
            .iter()
            .flatten()
            .map(|&s| {
                if s > SLOPE_DEAD_BAND {
                    1i8
                } else if s < -SLOPE_DEAD_BAND {
                    -1
                } else {
                    0
                }
            })
            .filter(|&s| s != 0)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// False unless all three slopes are defined.
    pub fn is_flat(&self) -> bool {
        self.all().iter().all(|s| s.is_some_and(|s| s.abs() < FLAT_SLOPE))
    }
}

/// Signed two-decimal slope, or "N/A".
pub fn fmt_slope(slope: Option<f64>) -> String {
    slope.map_or_else(|| "N/A".to_string(), |s| format!("{s:+.2}"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TangleDiagnostic {
    pub score: u8,
    pub reason: String,
    pub convergence_ratio: Option<f64>,
    pub slopes: MaSlopes,
    pub is_tangled: bool,
}

/// Scores the tangle conditions in their fixed order: convergence, then
/// divergence or flatness, then price crossing. Nothing fires while any of
/// MA5/MA10/MA20 is undefined.
pub fn detect(mas: &MaValues, slopes: MaSlopes, close: f64) -> TangleDiagnostic {
    let convergence_ratio = mas.convergence_ratio();
    let mut score = 0u8;
    let mut reasons: Vec<String> = Vec::new();

    if let Some(ratio) = convergence_ratio {
        if ratio < EXTREME_CONVERGENCE {
            score += 3;
            reasons.push(format!("均線極度糾結(間距{ratio:.2}%)"));
        } else if ratio < DENSE_CONVERGENCE {
            score += 2;
            reasons.push(format!("均線密集糾結(間距{ratio:.2}%)"));
        }

        if slopes.distinct_directions() >= 2 && ratio < DIVERGENCE_MAX_CONVERGENCE {
            score += 2;
            reasons.push(format!(
                "方向分歧(MA5:{}% MA10:{}% MA20:{}%)",
                fmt_slope(slopes.ma5),
                fmt_slope(slopes.ma10),
                fmt_slope(slopes.ma20)
            ));
        } else if slopes.is_flat() {
            score += 1;
            reasons.push("均線平緩".to_string());
        }

        if mas.contains(close) && ratio < CROSSING_MAX_CONVERGENCE {
            score += 1;
            reasons.push("價格穿梭均線間".to_string());
        }
    }

    debug!(score, ?convergence_ratio, "tangle score");

    TangleDiagnostic {
        score,
        reason: reasons.join("，"),
        convergence_ratio,
        slopes,
        is_tangled: score >= TANGLE_THRESHOLD,
    }
}
