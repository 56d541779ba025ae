// Bollinger and Keltner envelopes.
use super::window::{Column, band_position, ema, rolling_mean, rolling_std, zip_with};
use super::{Field, Prices};

pub const BOLL_WINDOW: usize = 20;
pub const KC_EMA_SPAN: usize = 20;
/// Simplified ATR: mean of high - low, ignoring gaps.
pub const KC_ATR_WINDOW: usize = 14;
pub const BAND_WIDTH: f64 = 2.0;

pub fn bollinger(prices: &Prices) -> Vec<(Field, Column)> {
    let middle = rolling_mean(&prices.close, BOLL_WINDOW);
    let std_dev = rolling_std(&prices.close, BOLL_WINDOW);
    let upper = zip_with(&middle, &std_dev, |m, s| m + BAND_WIDTH * s);
    let lower = zip_with(&middle, &std_dev, |m, s| m - BAND_WIDTH * s);
    let percent_b = band_position(&prices.close, &lower, &upper);
    vec![
        (Field::BbMiddle, middle),
        (Field::BbStdDev, std_dev),
        (Field::BbUpper, upper),
        (Field::BbLower, lower),
        (Field::PercentB, percent_b),
    ]
}

pub fn keltner(prices: &Prices) -> Vec<(Field, Column)> {
    let middle = ema(&prices.close, KC_EMA_SPAN);
    let range = zip_with(&prices.high, &prices.low, |h, l| h - l);
    let atr = rolling_mean(&range, KC_ATR_WINDOW);
    let upper = zip_with(&middle, &atr, |m, a| m + BAND_WIDTH * a);
    let lower = zip_with(&middle, &atr, |m, a| m - BAND_WIDTH * a);
    let position = band_position(&prices.close, &lower, &upper);
    vec![
        (Field::KcMiddle, middle),
        (Field::KcAtr, atr),
        (Field::KcUpper, upper),
        (Field::KcLower, lower),
        (Field::KcPosition, position),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::indicators::compute_indicators;
    use crate::indicators::test_support::{candles_from_closes, linear};

    #[test]
    fn flat_closes_collapse_bollinger_and_leave_percent_b_undefined() {
        let set = compute_indicators(&candles_from_closes(&[50.0; 30], 1.0), &AnalysisConfig::default());
        assert_eq!(set.last(Field::BbStdDev), Some(0.0));
        assert_eq!(set.last(Field::BbUpper), set.last(Field::BbLower));
        assert_eq!(set.last(Field::PercentB), None);
    }

    #[test]
    fn keltner_uses_high_low_range() {
        // high - low is always 2
        let set = compute_indicators(&candles_from_closes(&[50.0; 30], 1.0), &AnalysisConfig::default());
        assert_eq!(set.last(Field::KcAtr), Some(2.0));
        assert_eq!(set.last(Field::KcUpper), Some(54.0));
        assert_eq!(set.last(Field::KcLower), Some(46.0));
        assert_eq!(set.last(Field::KcPosition), Some(0.5));
    }

    #[test]
    fn percent_b_above_half_in_uptrend() {
        let set = compute_indicators(
            &candles_from_closes(&linear(40, 10.0, 50.0), 1.0),
            &AnalysisConfig::default(),
        );
        let middle = set.last(Field::BbMiddle).unwrap();
        let upper = set.last(Field::BbUpper).unwrap();
        let lower = set.last(Field::BbLower).unwrap();
        assert!((upper - middle - (middle - lower)).abs() < 1e-9);
        assert!(set.last(Field::PercentB).unwrap() > 0.5);
    }
}
