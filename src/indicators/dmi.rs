// Directional movement: TR, DI+, DI-, ADX.
use super::window::{Column, finite, rolling_mean, rolling_sum, zip_with};
use super::{Field, Prices};

pub const DMI_PERIOD: usize = 14;

pub fn dmi(prices: &Prices) -> Vec<(Field, Column)> {
    let n = prices.close.len();
    let mut tr: Column = vec![None; n];
    let mut dm_plus: Column = vec![None; n];
    let mut dm_minus: Column = vec![None; n];

    for i in 0..n {
        let (Some(high), Some(low)) = (prices.high[i], prices.low[i]) else {
            continue;
        };
        let prev = i.checked_sub(1).map(|p| (prices.high[p], prices.low[p], prices.close[p]));
        match prev {
            None => {
                tr[i] = finite(high - low);
                dm_plus[i] = Some(0.0);
                dm_minus[i] = Some(0.0);
            }
            Some((Some(prev_high), Some(prev_low), Some(prev_close))) => {
                let true_range = (high - low)
                    .max((high - prev_close).abs())
                    .max((low - prev_close).abs());
                tr[i] = finite(true_range);

                let up = high - prev_high;
                let down = prev_low - low;
                dm_plus[i] = Some(if up > 0.0 && up > down { up } else { 0.0 });
                dm_minus[i] = Some(if down > 0.0 && down > up { down } else { 0.0 });
            }
            Some(_) => {}
        }
    }

    let tr_sum = rolling_sum(&tr, DMI_PERIOD);
    let di_plus = zip_with(&rolling_sum(&dm_plus, DMI_PERIOD), &tr_sum, |dm, tr| dm / tr * 100.0);
    let di_minus = zip_with(&rolling_sum(&dm_minus, DMI_PERIOD), &tr_sum, |dm, tr| dm / tr * 100.0);
    let dx = zip_with(&di_plus, &di_minus, |p, m| (p - m).abs() / (p + m) * 100.0);
    let adx = rolling_mean(&dx, DMI_PERIOD);

    vec![
        (Field::Tr, tr),
        (Field::DiPlus, di_plus),
        (Field::DiMinus, di_minus),
        (Field::Adx, adx),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::indicators::compute_indicators;
    use crate::indicators::test_support::{candles_from_closes, linear};

    #[test]
    fn true_range_includes_gaps() {
        let mut candles = candles_from_closes(&[10.0, 20.0], 1.0);
        candles[1].low = 19.0;
        let set = compute_indicators(&candles, &AnalysisConfig::default());
        assert_eq!(set.value(Field::Tr, 0), Some(2.0));
        // |high - prev_close| = 21 - 10
        assert_eq!(set.value(Field::Tr, 1), Some(11.0));
    }

    #[test]
    fn uptrend_is_all_plus_movement() {
        let set = compute_indicators(
            &candles_from_closes(&linear(60, 100.0, 159.0), 1.0),
            &AnalysisConfig::default(),
        );
        assert_eq!(set.value(Field::DiPlus, 12), None);
        assert!(set.value(Field::DiPlus, 13).is_some());
        assert_eq!(set.last(Field::DiMinus), Some(0.0));
        assert!(set.last(Field::DiPlus).unwrap() > 0.0);
        assert_eq!(set.value(Field::Adx, 25), None);
        assert!((set.last(Field::Adx).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn flat_market_has_undefined_dx() {
        let set = compute_indicators(&candles_from_closes(&[10.0; 40], 1.0), &AnalysisConfig::default());
        assert_eq!(set.last(Field::DiPlus), Some(0.0));
        assert_eq!(set.last(Field::DiMinus), Some(0.0));
        assert_eq!(set.last(Field::Adx), None);
    }
}
