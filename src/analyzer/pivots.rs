use serde::{Deserialize, Serialize};

pub const PIVOT_RATIO_1: f64 = 0.382;
pub const PIVOT_RATIO_2: f64 = 0.618;
pub const PIVOT_RATIO_3: f64 = 1.0;

/// Fibonacci pivot levels derived from a period high, low and close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciPivots {
    #[serde(rename = "PP")]
    pub pp: f64,
    #[serde(rename = "R1")]
    pub r1: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
    #[serde(rename = "R3")]
    pub r3: f64,
    #[serde(rename = "S1")]
    pub s1: f64,
    #[serde(rename = "S2")]
    pub s2: f64,
    #[serde(rename = "S3")]
    pub s3: f64,
}

impl FibonacciPivots {
    pub fn calculate(high: f64, low: f64, close: f64) -> Self {
        let pp = (high + low + close) / 3.0;
        let range = high - low;
        Self {
            pp,
            r1: pp + PIVOT_RATIO_1 * range,
            r2: pp + PIVOT_RATIO_2 * range,
            r3: pp + PIVOT_RATIO_3 * range,
            s1: pp - PIVOT_RATIO_1 * range,
            s2: pp - PIVOT_RATIO_2 * range,
            s3: pp - PIVOT_RATIO_3 * range,
        }
    }

    pub fn major_support(&self) -> f64 {
        self.s1
    }

    pub fn major_resistance(&self) -> f64 {
        self.r1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn symmetric_range_around_close() {
        let p = FibonacciPivots::calculate(110.0, 90.0, 100.0);
        assert!(close_to(p.pp, 100.0));
        assert!(close_to(p.r1, 107.64));
        assert!(close_to(p.s1, 92.36));
        assert!(close_to(p.r2, 112.36));
        assert!(close_to(p.s2, 87.64));
        assert!(close_to(p.r3, 120.0));
        assert!(close_to(p.s3, 80.0));
        assert_eq!(p.major_support(), p.s1);
        assert_eq!(p.major_resistance(), p.r1);
    }

    #[test]
    fn serializes_with_level_names() {
        let json = serde_json::to_value(FibonacciPivots::calculate(2.0, 1.0, 1.5)).unwrap();
        for key in ["PP", "R1", "R2", "R3", "S1", "S2", "S3"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
