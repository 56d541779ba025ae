// Indicator calculator: augments a candle series with derived columns.

pub mod averages;
pub mod bands;
pub mod dmi;
pub mod oscillators;
pub mod window;

use crate::config::AnalysisConfig;
use crate::model::Candle;
use std::collections::BTreeMap;
use window::Column;

/// Every derived column the calculator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Ma5,
    Ma10,
    Ma20,
    Ma120,
    Vwma5,
    Vwma10,
    Vwma20,
    Ema12,
    Ema26,
    Dif,
    Dea,
    MacdHist,
    BbMiddle,
    BbStdDev,
    BbUpper,
    BbLower,
    PercentB,
    KcMiddle,
    KcAtr,
    KcUpper,
    KcLower,
    KcPosition,
    Rsi14,
    Rsv,
    K,
    D,
    J,
    Tr,
    DiPlus,
    DiMinus,
    Adx,
}

impl Field {
    pub const ALL: [Field; 31] = [
        Field::Ma5,
        Field::Ma10,
        Field::Ma20,
        Field::Ma120,
        Field::Vwma5,
        Field::Vwma10,
        Field::Vwma20,
        Field::Ema12,
        Field::Ema26,
        Field::Dif,
        Field::Dea,
        Field::MacdHist,
        Field::BbMiddle,
        Field::BbStdDev,
        Field::BbUpper,
        Field::BbLower,
        Field::PercentB,
        Field::KcMiddle,
        Field::KcAtr,
        Field::KcUpper,
        Field::KcLower,
        Field::KcPosition,
        Field::Rsi14,
        Field::Rsv,
        Field::K,
        Field::D,
        Field::J,
        Field::Tr,
        Field::DiPlus,
        Field::DiMinus,
        Field::Adx,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Ma5 => "MA5",
            Field::Ma10 => "MA10",
            Field::Ma20 => "MA20",
            Field::Ma120 => "MA120",
            Field::Vwma5 => "VWMA5",
            Field::Vwma10 => "VWMA10",
            Field::Vwma20 => "VWMA20",
            Field::Ema12 => "EMA12",
            Field::Ema26 => "EMA26",
            Field::Dif => "DIF",
            Field::Dea => "DEA",
            Field::MacdHist => "MACD_Hist",
            Field::BbMiddle => "BB_Middle",
            Field::BbStdDev => "BB_StdDev",
            Field::BbUpper => "BB_Upper",
            Field::BbLower => "BB_Lower",
            Field::PercentB => "Percent_B",
            Field::KcMiddle => "KC_Middle",
            Field::KcAtr => "KC_ATR",
            Field::KcUpper => "KC_Upper",
            Field::KcLower => "KC_Lower",
            Field::KcPosition => "KC_Position",
            Field::Rsi14 => "RSI14",
            Field::Rsv => "RSV",
            Field::K => "K",
            Field::D => "D",
            Field::J => "J",
            Field::Tr => "TR",
            Field::DiPlus => "DI_Plus",
            Field::DiMinus => "DI_Minus",
            Field::Adx => "ADX",
        }
    }

    #[cfg(test)]
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Derived columns, positionally aligned with the candles they were computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    len: usize,
    columns: BTreeMap<Field, Column>,
}

impl IndicatorSet {
    fn insert(&mut self, field: Field, column: Column) {
        debug_assert_eq!(column.len(), self.len);
        self.columns.insert(field, column);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn column(&self, field: Field) -> Option<&[Option<f64>]> {
        self.columns.get(&field).map(Vec::as_slice)
    }

    pub fn value(&self, field: Field, index: usize) -> Option<f64> {
        self.columns.get(&field).and_then(|c| c.get(index).copied().flatten())
    }

    /// Value `back` positions before the last one (`back = 0` is the last row).
    pub fn back(&self, field: Field, back: usize) -> Option<f64> {
        let index = self.len.checked_sub(back + 1)?;
        self.value(field, index)
    }

    pub fn last(&self, field: Field) -> Option<f64> {
        self.back(field, 0)
    }
}

/// A candle series together with its indicator columns. Owned by one analysis pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    candles: Vec<Candle>,
    indicators: IndicatorSet,
}

impl Series {
    pub fn new(candles: Vec<Candle>, config: &AnalysisConfig) -> Self {
        let indicators = compute_indicators(&candles, config);
        Self { candles, indicators }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last_candle(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn close_back(&self, back: usize) -> Option<f64> {
        let index = self.candles.len().checked_sub(back + 1)?;
        Some(self.candles[index].close)
    }

    /// Highest high and lowest low over the trailing `window` candles.
    pub fn recent_range(&self, window: usize) -> Option<(f64, f64)> {
        let start = self.candles.len().saturating_sub(window.max(1));
        let tail = &self.candles[start..];
        if tail.is_empty() {
            return None;
        }
        let high = tail.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let low = tail.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        Some((high, low))
    }
}

/// Computes every indicator column for `candles`. Pure and deterministic.
pub fn compute_indicators(candles: &[Candle], config: &AnalysisConfig) -> IndicatorSet {
    let prices = Prices::from_candles(candles);
    let mut set = IndicatorSet {
        len: candles.len(),
        columns: BTreeMap::new(),
    };

    for (field, column) in averages::moving_averages(&prices)
        .into_iter()
        .chain(averages::macd(&prices))
        .chain(bands::bollinger(&prices))
        .chain(bands::keltner(&prices))
        .chain(oscillators::rsi(&prices))
        .chain(oscillators::kdj(&prices))
    {
        set.insert(field, column);
    }

    if config.enable_dmi {
        for (field, column) in dmi::dmi(&prices) {
            set.insert(field, column);
        }
    }

    set
}

/// OHLCV split into columns once so each indicator group can borrow them.
pub struct Prices {
    pub high: Column,
    pub low: Column,
    pub close: Column,
    pub volume: Column,
}

impl Prices {
    pub fn from_candles(candles: &[Candle]) -> Self {
        let pick = |f: fn(&Candle) -> f64| -> Column {
            candles.iter().map(|c| window::finite(f(c))).collect()
        };
        Self {
            high: pick(|c| c.high),
            low: pick(|c| c.low),
            close: pick(|c| c.close),
            volume: pick(|c| c.volume),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::Candle;
    use chrono::{TimeZone, Utc};

    /// Builds hourly candles with `high = close + 1`, `low = close - 1`.
    pub fn candles_from_closes(closes: &[f64], volume: f64) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                open_time: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume,
            })
            .collect()
    }

    pub fn linear(n: usize, from: f64, to: f64) -> Vec<f64> {
        let step = (to - from) / (n - 1) as f64;
        (0..n).map(|i| from + step * i as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("DX"), None);
    }

    #[test]
    fn windows_leave_leading_positions_undefined() {
        let candles = candles_from_closes(&linear(130, 100.0, 150.0), 1000.0);
        let set = compute_indicators(&candles, &AnalysisConfig::default());
        assert_eq!(set.value(Field::Ma5, 3), None);
        assert!(set.value(Field::Ma5, 4).is_some());
        assert_eq!(set.value(Field::Ma120, 118), None);
        assert!(set.value(Field::Ma120, 119).is_some());
        assert!(set.value(Field::Ema26, 0).is_some());
    }

    #[test]
    fn rising_closes_order_short_averages_above_long() {
        let candles = candles_from_closes(&linear(130, 100.0, 150.0), 1000.0);
        let set = compute_indicators(&candles, &AnalysisConfig::default());
        let ma5 = set.last(Field::Ma5).unwrap();
        let ma10 = set.last(Field::Ma10).unwrap();
        let ma20 = set.last(Field::Ma20).unwrap();
        assert!(ma5 >= ma10 && ma10 >= ma20);
    }

    #[test]
    fn dmi_columns_follow_config() {
        let candles = candles_from_closes(&linear(40, 100.0, 140.0), 10.0);
        let off = AnalysisConfig {
            enable_dmi: false,
            ..AnalysisConfig::default()
        };
        assert!(!compute_indicators(&candles, &off).has(Field::Adx));
        assert!(compute_indicators(&candles, &AnalysisConfig::default()).has(Field::Adx));
    }

    #[test]
    fn back_indexes_from_the_end() {
        let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 1.0);
        let series = Series::new(candles, &AnalysisConfig::default());
        assert_eq!(series.indicators().last(Field::Ma5), Some(4.0));
        assert_eq!(series.indicators().back(Field::Ma5, 1), Some(3.0));
        assert_eq!(series.indicators().back(Field::Ma5, 6), None);
        assert_eq!(series.close_back(4), Some(2.0));
        assert_eq!(series.recent_range(3), Some((7.0, 3.0)));
    }

    #[test]
    fn empty_series_has_no_values() {
        let series = Series::new(Vec::new(), &AnalysisConfig::default());
        assert!(series.is_empty());
        assert_eq!(series.indicators().last(Field::Ma5), None);
        assert_eq!(series.recent_range(24), None);
    }
}
