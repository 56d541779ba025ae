// MA, VWMA and MACD columns.
use super::window::{Column, ema, rolling_mean, rolling_sum, zip_with};
use super::{Field, Prices};

pub const MA_WINDOWS: [(Field, usize); 4] = [
    (Field::Ma5, 5),
    (Field::Ma10, 10),
    (Field::Ma20, 20),
    (Field::Ma120, 120),
];

pub const VWMA_WINDOWS: [(Field, usize); 3] = [
    (Field::Vwma5, 5),
    (Field::Vwma10, 10),
    (Field::Vwma20, 20),
];

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

pub fn moving_averages(prices: &Prices) -> Vec<(Field, Column)> {
    let mut out: Vec<(Field, Column)> = MA_WINDOWS
        .iter()
        .map(|&(field, window)| (field, rolling_mean(&prices.close, window)))
        .collect();

    let turnover = zip_with(&prices.close, &prices.volume, |c, v| c * v);
    for &(field, window) in &VWMA_WINDOWS {
        let weighted = rolling_sum(&turnover, window);
        let volume = rolling_sum(&prices.volume, window);
        out.push((field, zip_with(&weighted, &volume, |pv, v| pv / v)));
    }
    out
}

pub fn macd(prices: &Prices) -> Vec<(Field, Column)> {
    let fast = ema(&prices.close, MACD_FAST);
    let slow = ema(&prices.close, MACD_SLOW);
    let dif = zip_with(&fast, &slow, |f, s| f - s);
    let dea = ema(&dif, MACD_SIGNAL);
    let hist = zip_with(&dif, &dea, |d, e| 2.0 * (d - e));
    vec![
        (Field::Ema12, fast),
        (Field::Ema26, slow),
        (Field::Dif, dif),
        (Field::Dea, dea),
        (Field::MacdHist, hist),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::indicators::compute_indicators;
    use crate::indicators::test_support::{candles_from_closes, linear};

    #[test]
    fn vwma_equals_ma_for_constant_volume() {
        let candles = candles_from_closes(&linear(30, 10.0, 40.0), 500.0);
        let set = compute_indicators(&candles, &AnalysisConfig::default());
        let ma = set.last(Field::Ma10).unwrap();
        let vwma = set.last(Field::Vwma10).unwrap();
        assert!((ma - vwma).abs() < 1e-9);
    }

    #[test]
    fn vwma_leans_toward_heavy_volume() {
        let mut candles = candles_from_closes(&[10.0, 10.0, 10.0, 10.0, 20.0], 1.0);
        candles[4].volume = 9.0;
        let set = compute_indicators(&candles, &AnalysisConfig::default());
        // (4*10 + 9*20) / 13
        assert!((set.last(Field::Vwma5).unwrap() - 220.0 / 13.0).abs() < 1e-9);
        assert_eq!(set.last(Field::Ma5), Some(12.0));
    }

    #[test]
    fn zero_volume_window_is_undefined() {
        let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.0);
        let set = compute_indicators(&candles, &AnalysisConfig::default());
        assert_eq!(set.last(Field::Vwma5), None);
    }

    #[test]
    fn histogram_is_twice_dif_minus_dea() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i as f64 * 0.35).sin() * 7.0 + i as f64 * 0.1)
            .collect();
        let set = compute_indicators(&candles_from_closes(&closes, 1.0), &AnalysisConfig::default());
        let mut flips = 0;
        for i in 0..closes.len() {
            let (Some(dif), Some(dea), Some(hist)) = (
                set.value(Field::Dif, i),
                set.value(Field::Dea, i),
                set.value(Field::MacdHist, i),
            ) else {
                panic!("MACD columns are defined from the first candle");
            };
            assert!((hist - 2.0 * (dif - dea)).abs() < 1e-12);
            assert_eq!(hist > 0.0, dif > dea);
            if i > 0 && set.value(Field::MacdHist, i - 1).unwrap().signum() != hist.signum() {
                flips += 1;
            }
        }
        assert!(flips > 0);
    }

    #[test]
    fn dif_is_positive_in_an_uptrend() {
        let set = compute_indicators(
            &candles_from_closes(&linear(60, 100.0, 160.0), 1.0),
            &AnalysisConfig::default(),
        );
        assert!(set.last(Field::Dif).unwrap() > 0.0);
    }
}
