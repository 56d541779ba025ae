// RSI and KDJ.
use super::window::{Column, ema, rolling_max, rolling_min, zip_with, zip3_with};
use super::{Field, Prices};

pub const RSI_SPAN: usize = 14;
pub const KDJ_WINDOW: usize = 9;
pub const KDJ_SMOOTHING: usize = 3;

pub fn rsi(prices: &Prices) -> Vec<(Field, Column)> {
    let (gains, losses): (Column, Column) = prices
        .close
        .iter()
        .enumerate()
        .map(|(i, close)| {
            // The first candle has no delta and counts as neither gain nor loss.
            let delta = match (i.checked_sub(1).and_then(|p| prices.close[p]), close) {
                (Some(prev), Some(close)) => Some(close - prev),
                (None, Some(_)) if i == 0 => Some(0.0),
                _ => None,
            };
            (delta.map(|d| d.max(0.0)), delta.map(|d| (-d).max(0.0)))
        })
        .unzip();

    let avg_gain = ema(&gains, RSI_SPAN);
    let avg_loss = ema(&losses, RSI_SPAN);
    // avg_loss == 0 with gains gives rs = inf and RSI = 100; 0/0 stays undefined.
    let rsi = zip_with(&avg_gain, &avg_loss, |g, l| 100.0 - 100.0 / (1.0 + g / l));
    vec![(Field::Rsi14, rsi)]
}

pub fn kdj(prices: &Prices) -> Vec<(Field, Column)> {
    let low_min = rolling_min(&prices.low, KDJ_WINDOW);
    let high_max = rolling_max(&prices.high, KDJ_WINDOW);
    let rsv = zip3_with(&prices.close, &low_min, &high_max, |c, lo, hi| (c - lo) / (hi - lo) * 100.0);
    let k = ema(&rsv, KDJ_SMOOTHING);
    let d = ema(&k, KDJ_SMOOTHING);
    let j = zip_with(&k, &d, |k, d| 3.0 * k - 2.0 * d);
    vec![(Field::Rsv, rsv), (Field::K, k), (Field::D, d), (Field::J, j)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::indicators::compute_indicators;
    use crate::indicators::test_support::{candles_from_closes, linear};

    #[test]
    fn rsi_hits_100_without_losses() {
        let set = compute_indicators(
            &candles_from_closes(&linear(30, 1.0, 30.0), 1.0),
            &AnalysisConfig::default(),
        );
        assert_eq!(set.last(Field::Rsi14), Some(100.0));
        // no movement at all yet
        assert_eq!(set.value(Field::Rsi14, 0), None);
    }

    #[test]
    fn rsi_is_zero_without_gains() {
        let set = compute_indicators(
            &candles_from_closes(&linear(30, 30.0, 1.0), 1.0),
            &AnalysisConfig::default(),
        );
        assert_eq!(set.last(Field::Rsi14), Some(0.0));
    }

    #[test]
    fn rsi_stays_bounded() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0 + (i as f64 * 0.13).cos() * 4.0)
            .collect();
        let set = compute_indicators(&candles_from_closes(&closes, 1.0), &AnalysisConfig::default());
        for value in set.column(Field::Rsi14).unwrap().iter().flatten() {
            assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn kdj_relationships() {
        let closes: Vec<f64> = (0..50).map(|i| 20.0 + (i as f64 * 0.5).sin() * 3.0).collect();
        let set = compute_indicators(&candles_from_closes(&closes, 1.0), &AnalysisConfig::default());
        assert_eq!(set.value(Field::Rsv, 7), None);
        assert!(set.value(Field::Rsv, 8).is_some());
        assert_eq!(set.value(Field::K, 7), None);
        assert_eq!(set.value(Field::K, 8), set.value(Field::Rsv, 8));
        let k = set.last(Field::K).unwrap();
        let d = set.last(Field::D).unwrap();
        assert!((set.last(Field::J).unwrap() - (3.0 * k - 2.0 * d)).abs() < 1e-9);
    }

    #[test]
    fn rsv_is_high_at_top_of_range() {
        let set = compute_indicators(
            &candles_from_closes(&linear(20, 10.0, 29.0), 1.0),
            &AnalysisConfig::default(),
        );
        // close 29, lowest low 20, highest high 30
        assert!((set.last(Field::Rsv).unwrap() - 90.0).abs() < 1e-9);
    }
}
