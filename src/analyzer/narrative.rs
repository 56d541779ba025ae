//! Per-indicator narratives.
//!
//! Each indicator is first mapped to a bracket from its last-row values, and
//! each bracket renders one fixed template. Undefined inputs land in an
//! `Insufficient` bracket instead of being compared.

use super::tangle::{fmt_slope, MaValues, TangleDiagnostic};
use super::trend::{TrendStrength, TrendType, TrendVerdict};
use crate::indicators::{Field, Series};
use crate::utils::fmt_opt;
use serde::{Deserialize, Serialize};

pub const VWMA_VOLUME_DEVIATION: f64 = 0.1;
pub const BOLL_ABOVE_UPPER: f64 = 1.0;
pub const BOLL_NEAR_UPPER: f64 = 0.8;
pub const BOLL_BELOW_LOWER: f64 = 0.0;
pub const BOLL_NEAR_LOWER: f64 = 0.2;
pub const BOLL_UPPER_HALF: f64 = 0.6;
pub const BOLL_LOWER_HALF: f64 = 0.4;
pub const KC_UPPER_PROXIMITY: f64 = 0.98;
pub const KC_LOWER_PROXIMITY: f64 = 1.02;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const KDJ_HIGH: f64 = 80.0;
pub const KDJ_LOW: f64 = 20.0;
pub const ADX_STRONG: f64 = 25.0;
pub const ADX_MODERATE: f64 = 20.0;

const INSUFFICIENT: &str = "數據不足，暫無判斷。";

/// Last-row indicator values read by the narratives.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatestValues {
    pub close: f64,
    pub vwma5: Option<f64>,
    pub vwma10: Option<f64>,
    pub vwma20: Option<f64>,
    pub dif: Option<f64>,
    pub dea: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub percent_b: Option<f64>,
    pub kc_upper: Option<f64>,
    pub kc_middle: Option<f64>,
    pub kc_lower: Option<f64>,
    pub kc_position: Option<f64>,
    pub rsi14: Option<f64>,
    pub k: Option<f64>,
    pub d: Option<f64>,
    pub j: Option<f64>,
    pub di_plus: Option<f64>,
    pub di_minus: Option<f64>,
    pub adx: Option<f64>,
}

impl LatestValues {
    pub fn from_series(series: &Series) -> Self {
        let set = series.indicators();
        let last = |field| set.last(field);
        Self {
            close: series.last_candle().map(|c| c.close).unwrap_or(f64::NAN),
            vwma5: last(Field::Vwma5),
            vwma10: last(Field::Vwma10),
            vwma20: last(Field::Vwma20),
            dif: last(Field::Dif),
            dea: last(Field::Dea),
            macd_hist: last(Field::MacdHist),
            bb_upper: last(Field::BbUpper),
            bb_middle: last(Field::BbMiddle),
            bb_lower: last(Field::BbLower),
            percent_b: last(Field::PercentB),
            kc_upper: last(Field::KcUpper),
            kc_middle: last(Field::KcMiddle),
            kc_lower: last(Field::KcLower),
            kc_position: last(Field::KcPosition),
            rsi14: last(Field::Rsi14),
            k: last(Field::K),
            d: last(Field::D),
            j: last(Field::J),
            di_plus: last(Field::DiPlus),
            di_minus: last(Field::DiMinus),
            adx: last(Field::Adx),
        }
    }
}

/// Narrative text per indicator, keyed by the report's indicator names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    #[serde(rename = "均線系統")]
    pub ma_system: String,
    #[serde(rename = "VWMA")]
    pub vwma: String,
    #[serde(rename = "MACD")]
    pub macd: String,
    #[serde(rename = "BOLL")]
    pub boll: String,
    #[serde(rename = "KC")]
    pub kc: String,
    #[serde(rename = "RSI")]
    pub rsi: String,
    #[serde(rename = "KDJ")]
    pub kdj: String,
    #[serde(rename = "DMI", default, skip_serializing_if = "Option::is_none")]
    pub dmi: Option<String>,
}

pub struct NarrativeInput<'a> {
    pub values: &'a LatestValues,
    pub mas: &'a MaValues,
    pub tangle: &'a TangleDiagnostic,
    pub verdict: &'a TrendVerdict,
    pub include_dmi: bool,
}

pub fn summarize(input: &NarrativeInput<'_>) -> IndicatorSummary {
    let v = input.values;
    IndicatorSummary {
        ma_system: ma_system(input.mas, input.tangle, input.verdict),
        vwma: render_vwma(vwma_bracket(v, input.mas), v, input.mas),
        macd: render_macd(macd_bracket(v), v),
        boll: render_boll(boll_bracket(v.percent_b), v),
        kc: render_kc(kc_bracket(v), v),
        rsi: render_rsi(rsi_bracket(v.rsi14), v),
        kdj: render_kdj(kdj_bracket(v), v),
        dmi: input.include_dmi.then(|| render_dmi(dmi_bracket(v), v)),
    }
}

fn p2(value: Option<f64>) -> String {
    fmt_opt(value, 2)
}

fn p4(value: Option<f64>) -> String {
    fmt_opt(value, 4)
}

fn percent(value: Option<f64>) -> String {
    format!("{}%", fmt_opt(value.map(|v| v * 100.0), 2))
}

fn ma_system(mas: &MaValues, tangle: &TangleDiagnostic, verdict: &TrendVerdict) -> String {
    let (ma5, ma10, ma20) = (p2(mas.ma5), p2(mas.ma10), p2(mas.ma20));
    let ratio = p2(tangle.convergence_ratio);
    match verdict.trend_type {
        TrendType::Tangled => format!(
            "⚠️ 均線糾結狀態。{}。MA5={ma5}, MA10={ma10}, MA20={ma20}，收斂度{ratio}%，等待方向選擇。",
            tangle.reason
        ),
        TrendType::Bullish => {
            let cross = if cmp_gt(mas.ma5, mas.ma10) { "金叉" } else { "準金叉" };
            let strength = match verdict.strength {
                Some(TrendStrength::Strong) => "強勢突破",
                _ => "溫和上升",
            };
            format!(
                "🟢 多頭排列({strength})。MA5（{ma5}）與MA10（{ma10}）形成{cross}，價格站上MA20（{ma20}），MA20斜率{}%，短期動能偏強。",
                fmt_slope(tangle.slopes.ma20)
            )
        }
        TrendType::Bearish => {
            let cross = if cmp_gt(mas.ma10, mas.ma5) { "死叉" } else { "準死叉" };
            let strength = match verdict.strength {
                Some(TrendStrength::Strong) => "強勢下跌",
                _ => "溫和下降",
            };
            format!(
                "🔴 空頭排列({strength})。MA5（{ma5}）與MA10（{ma10}）形成{cross}，價格跌破MA20（{ma20}），MA20斜率{}%，短期動能偏弱。",
                fmt_slope(tangle.slopes.ma20)
            )
        }
        TrendType::Ranging => format!(
            "🟡 震盪整理。MA5={ma5}, MA10={ma10}, MA20={ma20}，收斂度{ratio}%，方向不明確，觀望為主。"
        ),
    }
}

fn cmp_gt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VwmaBracket {
    BullishBacked,
    BullishThin,
    BearishBacked,
    BearishThin,
    Mixed,
    Insufficient,
}

fn vwma_deviation(vwma: Option<f64>, ma: Option<f64>) -> Option<f64> {
    let (vwma, ma) = (vwma?, ma?);
    crate::indicators::window::finite((vwma - ma) / ma * 100.0)
}

pub fn vwma_bracket(v: &LatestValues, mas: &MaValues) -> VwmaBracket {
    let (Some(v5), Some(v10), Some(v20)) = (v.vwma5, v.vwma10, v.vwma20) else {
        return VwmaBracket::Insufficient;
    };
    let Some(deviation) = vwma_deviation(v.vwma20, mas.ma20) else {
        return VwmaBracket::Insufficient;
    };

    if v5 > v10 && v10 > v20 && v.close > v20 {
        if deviation > VWMA_VOLUME_DEVIATION {
            VwmaBracket::BullishBacked
        } else {
            VwmaBracket::BullishThin
        }
    } else if v5 < v10 && v10 < v20 && v.close < v20 {
        if deviation < -VWMA_VOLUME_DEVIATION {
            VwmaBracket::BearishBacked
        } else {
            VwmaBracket::BearishThin
        }
    } else {
        VwmaBracket::Mixed
    }
}

fn render_vwma(bracket: VwmaBracket, v: &LatestValues, mas: &MaValues) -> String {
    let (v5, v10, v20) = (p2(v.vwma5), p2(v.vwma10), p2(v.vwma20));
    let dev20 = vwma_deviation(v.vwma20, mas.ma20);
    match bracket {
        VwmaBracket::BullishBacked => format!(
            "量價配合良好。VWMA5（{v5}）>VWMA10（{v10}）>VWMA20（{v20}），且VWMA20較MA20高{}%，顯示上漲有量能支撐。",
            p2(dev20)
        ),
        VwmaBracket::BullishThin => format!(
            "量價排列偏多但量能一般。VWMA5（{v5}）>VWMA10（{v10}）>VWMA20（{v20}），VWMA與MA差異{}%，量能支撐有限。",
            p2(dev20)
        ),
        VwmaBracket::BearishBacked => format!(
            "量價背離偏空。VWMA5（{v5}）<VWMA10（{v10}）<VWMA20（{v20}），且VWMA20較MA20低{}%，顯示下跌有量能推動。",
            p2(dev20.map(f64::abs))
        ),
        VwmaBracket::BearishThin => format!(
            "量價排列偏空但量能不足。VWMA5（{v5}）<VWMA10（{v10}）<VWMA20（{v20}），VWMA與MA差異{}%，下跌缺乏量能。",
            p2(dev20)
        ),
        VwmaBracket::Mixed => format!(
            "量價關係複雜。VWMA5={v5}, VWMA10={v10}, VWMA20={v20}，與MA偏差{}%，需觀察量價配合度。",
            p2(vwma_deviation(v.vwma5, mas.ma5))
        ),
        VwmaBracket::Insufficient => format!("VWMA{INSUFFICIENT}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdBracket {
    GoldenAboveZero,
    DeadAboveZero,
    Weak,
    Insufficient,
}

pub fn macd_bracket(v: &LatestValues) -> MacdBracket {
    let (Some(dif), Some(dea)) = (v.dif, v.dea) else {
        return MacdBracket::Insufficient;
    };
    if dif > dea && dif > 0.0 {
        MacdBracket::GoldenAboveZero
    } else if dif < dea && dif > 0.0 {
        MacdBracket::DeadAboveZero
    } else {
        MacdBracket::Weak
    }
}

fn render_macd(bracket: MacdBracket, v: &LatestValues) -> String {
    let (dif, dea, hist) = (p4(v.dif), p4(v.dea), p4(v.macd_hist));
    match bracket {
        MacdBracket::GoldenAboveZero => format!(
            "金叉運行中。DIF（{dif}）高於DEA（{dea}），且均在零軸上方，柱狀圖為{hist}，顯示多頭動能強勁。"
        ),
        MacdBracket::DeadAboveZero => format!(
            "死叉運行中但收斂。DIF（{dif}）仍高於零軸，DEA（{dea}）趨平，柱狀圖縮減至{hist}，暗示空頭動能減弱。"
        ),
        MacdBracket::Weak => format!("MACD指標偏空或震盪。DIF={dif}, DEA={dea}, 柱狀圖={hist}。"),
        MacdBracket::Insufficient => format!("MACD{INSUFFICIENT}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollBracket {
    AboveUpper,
    NearUpper,
    BelowLower,
    NearLower,
    UpperHalf,
    LowerHalf,
    Middle,
    Insufficient,
}

/// Checked in order; the first matching boundary wins.
pub fn boll_bracket(percent_b: Option<f64>) -> BollBracket {
    let Some(pb) = percent_b else {
        return BollBracket::Insufficient;
    };
    if pb > BOLL_ABOVE_UPPER {
        BollBracket::AboveUpper
    } else if pb > BOLL_NEAR_UPPER {
        BollBracket::NearUpper
    } else if pb < BOLL_BELOW_LOWER {
        BollBracket::BelowLower
    } else if pb < BOLL_NEAR_LOWER {
        BollBracket::NearLower
    } else if pb > BOLL_UPPER_HALF {
        BollBracket::UpperHalf
    } else if pb < BOLL_LOWER_HALF {
        BollBracket::LowerHalf
    } else {
        BollBracket::Middle
    }
}

fn render_boll(bracket: BollBracket, v: &LatestValues) -> String {
    let (upper, middle, lower) = (p2(v.bb_upper), p2(v.bb_middle), p2(v.bb_lower));
    let pb = percent(v.percent_b);
    match bracket {
        BollBracket::AboveUpper => format!("價格突破上軌（{upper}），%B（{pb}）顯示超買，注意回調風險。"),
        BollBracket::NearUpper => {
            format!("價格貼近上軌（{upper}），%B（{pb}）偏高，中軌（{middle}）提供動態支撐。")
        }
        BollBracket::BelowLower => format!("價格跌破下軌（{lower}），%B（{pb}）顯示超賣，可能出現反彈。"),
        BollBracket::NearLower => {
            format!("價格貼近下軌（{lower}），%B（{pb}）偏低，中軌（{middle}）提供動態壓力。")
        }
        BollBracket::UpperHalf => format!("價格位於布林帶上半部，%B（{pb}）偏強，上軌（{upper}）為壓力位。"),
        BollBracket::LowerHalf => format!("價格位於布林帶下半部，%B（{pb}）偏弱，下軌（{lower}）為支撐位。"),
        BollBracket::Middle => format!(
            "價格在布林帶中軌附近震盪，%B（{pb}）中性，上軌（{upper}）壓力，下軌（{lower}）支撐。"
        ),
        BollBracket::Insufficient => format!("布林帶{INSUFFICIENT}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KcBracket {
    NearUpper,
    NearLower,
    Inside,
    Insufficient,
}

pub fn kc_bracket(v: &LatestValues) -> KcBracket {
    let (Some(upper), Some(lower)) = (v.kc_upper, v.kc_lower) else {
        return KcBracket::Insufficient;
    };
    if v.close > upper * KC_UPPER_PROXIMITY {
        KcBracket::NearUpper
    } else if v.close < lower * KC_LOWER_PROXIMITY {
        KcBracket::NearLower
    } else {
        KcBracket::Inside
    }
}

fn render_kc(bracket: KcBracket, v: &LatestValues) -> String {
    let (upper, middle, lower) = (p2(v.kc_upper), p2(v.kc_middle), p2(v.kc_lower));
    let position = percent(v.kc_position);
    match bracket {
        KcBracket::NearUpper => format!(
            "價格突破上軌（{upper}），KC位置（{position}）顯示強勢，中軌（{middle}）成為動態支撐。"
        ),
        KcBracket::NearLower => format!(
            "價格跌破下軌（{lower}），KC位置（{position}）顯示弱勢，中軌（{middle}）成為動態阻力。"
        ),
        KcBracket::Inside => format!(
            "價格在肯特納通道內運行。上軌={upper}, 中軌={middle}, 下軌={lower}, 位置={position}。"
        ),
        KcBracket::Insufficient => format!("肯特納通道{INSUFFICIENT}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiBracket {
    Overbought,
    Oversold,
    Neutral,
    Insufficient,
}

pub fn rsi_bracket(rsi: Option<f64>) -> RsiBracket {
    match rsi {
        Some(r) if r > RSI_OVERBOUGHT => RsiBracket::Overbought,
        Some(r) if r < RSI_OVERSOLD => RsiBracket::Oversold,
        Some(_) => RsiBracket::Neutral,
        None => RsiBracket::Insufficient,
    }
}

fn render_rsi(bracket: RsiBracket, v: &LatestValues) -> String {
    let rsi = p2(v.rsi14);
    match bracket {
        RsiBracket::Overbought => format!("RSI14（{rsi}）進入超買區（70），需警惕回調風險。"),
        RsiBracket::Oversold => format!("RSI14（{rsi}）進入超賣區（30），可能出現反彈。"),
        RsiBracket::Neutral => format!("RSI14（{rsi}）中性偏強，未達超買區（70），與價格走勢同步。"),
        RsiBracket::Insufficient => format!("RSI{INSUFFICIENT}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdjBracket {
    GoldenCross,
    DeadCross,
    Extreme,
    Insufficient,
}

pub fn kdj_bracket(v: &LatestValues) -> KdjBracket {
    let (Some(k), Some(d)) = (v.k, v.d) else {
        return KdjBracket::Insufficient;
    };
    if k > d && d < KDJ_HIGH && k < KDJ_HIGH {
        KdjBracket::GoldenCross
    } else if k < d && d > KDJ_LOW && k > KDJ_LOW {
        KdjBracket::DeadCross
    } else {
        KdjBracket::Extreme
    }
}

fn render_kdj(bracket: KdjBracket, v: &LatestValues) -> String {
    let (k, d, j) = (p2(v.k), p2(v.d), p2(v.j));
    match bracket {
        KdjBracket::GoldenCross => format!("金叉初現。K值（{k}）上穿D值（{d}），J值（{j}）轉強。"),
        KdjBracket::DeadCross => format!("死叉運行。K值（{k}）下穿D值（{d}），J值（{j}）轉弱。"),
        KdjBracket::Extreme => format!("KDJ指標震盪或處於極端區域。K值={k}, D值={d}, J值={j}。"),
        KdjBracket::Insufficient => format!("KDJ{INSUFFICIENT}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdxStrength {
    Strong,
    Moderate,
    Weak,
}

impl AdxStrength {
    pub fn from_adx(adx: f64) -> Self {
        if adx >= ADX_STRONG {
            AdxStrength::Strong
        } else if adx >= ADX_MODERATE {
            AdxStrength::Moderate
        } else {
            AdxStrength::Weak
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdxStrength::Strong => "強勢",
            AdxStrength::Moderate => "中等",
            AdxStrength::Weak => "弱勢",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmiBracket {
    Bullish(AdxStrength),
    Bearish(AdxStrength),
    Undecided(AdxStrength),
    Insufficient,
}

pub fn dmi_bracket(v: &LatestValues) -> DmiBracket {
    let (Some(plus), Some(minus), Some(adx)) = (v.di_plus, v.di_minus, v.adx) else {
        return DmiBracket::Insufficient;
    };
    let strength = AdxStrength::from_adx(adx);
    if plus > minus {
        DmiBracket::Bullish(strength)
    } else if minus > plus {
        DmiBracket::Bearish(strength)
    } else {
        DmiBracket::Undecided(strength)
    }
}

fn render_dmi(bracket: DmiBracket, v: &LatestValues) -> String {
    let (plus, minus, adx) = (p2(v.di_plus), p2(v.di_minus), p2(v.adx));
    match bracket {
        DmiBracket::Bullish(s @ AdxStrength::Strong) => format!(
            "多頭{0}趨勢。DI+（{plus}）高於DI-（{minus}），ADX（{adx}）顯示{0}趨勢，上漲動能充足。",
            s.as_str()
        ),
        DmiBracket::Bullish(s @ AdxStrength::Moderate) => format!(
            "多頭{0}趨勢。DI+（{plus}）略高於DI-（{minus}），ADX（{adx}）顯示{0}趨勢，上漲動能一般。",
            s.as_str()
        ),
        DmiBracket::Bullish(s) => format!(
            "多頭偏向但趨勢{}。DI+（{plus}）高於DI-（{minus}），但ADX（{adx}）偏低，缺乏明確方向。",
            s.as_str()
        ),
        DmiBracket::Bearish(s @ AdxStrength::Strong) => format!(
            "空頭{0}趨勢。DI-（{minus}）高於DI+（{plus}），ADX（{adx}）顯示{0}趨勢，下跌動能充足。",
            s.as_str()
        ),
        DmiBracket::Bearish(s @ AdxStrength::Moderate) => format!(
            "空頭{0}趨勢。DI-（{minus}）略高於DI+（{plus}），ADX（{adx}）顯示{0}趨勢，下跌動能一般。",
            s.as_str()
        ),
        DmiBracket::Bearish(s) => format!(
            "空頭偏向但趨勢{}。DI-（{minus}）高於DI+（{plus}），但ADX（{adx}）偏低，缺乏明確方向。",
            s.as_str()
        ),
        DmiBracket::Undecided(s) => format!(
            "方向不明。DI+（{plus}）與DI-（{minus}）接近，ADX（{adx}）顯示{}趨勢，市場處於整理狀態。",
            s.as_str()
        ),
        DmiBracket::Insufficient => format!("DMI{INSUFFICIENT}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boll_boundaries_are_exclusive() {
        assert_eq!(boll_bracket(Some(1.01)), BollBracket::AboveUpper);
        assert_eq!(boll_bracket(Some(1.0)), BollBracket::NearUpper);
        assert_eq!(boll_bracket(Some(0.8)), BollBracket::UpperHalf);
        assert_eq!(boll_bracket(Some(0.6)), BollBracket::Middle);
        assert_eq!(boll_bracket(Some(0.4)), BollBracket::Middle);
        assert_eq!(boll_bracket(Some(0.39)), BollBracket::LowerHalf);
        assert_eq!(boll_bracket(Some(0.2)), BollBracket::LowerHalf);
        assert_eq!(boll_bracket(Some(0.19)), BollBracket::NearLower);
        assert_eq!(boll_bracket(Some(0.0)), BollBracket::NearLower);
        assert_eq!(boll_bracket(Some(-0.01)), BollBracket::BelowLower);
        assert_eq!(boll_bracket(None), BollBracket::Insufficient);
    }

    #[test]
    fn rsi_thresholds() {
        assert_eq!(rsi_bracket(Some(70.0)), RsiBracket::Neutral);
        assert_eq!(rsi_bracket(Some(70.01)), RsiBracket::Overbought);
        assert_eq!(rsi_bracket(Some(30.0)), RsiBracket::Neutral);
        assert_eq!(rsi_bracket(Some(29.99)), RsiBracket::Oversold);
        assert_eq!(rsi_bracket(None), RsiBracket::Insufficient);
    }

    #[test]
    fn adx_brackets() {
        assert_eq!(AdxStrength::from_adx(25.0), AdxStrength::Strong);
        assert_eq!(AdxStrength::from_adx(24.9), AdxStrength::Moderate);
        assert_eq!(AdxStrength::from_adx(20.0), AdxStrength::Moderate);
        assert_eq!(AdxStrength::from_adx(19.9), AdxStrength::Weak);
    }

    #[test]
    fn dmi_direction_and_text() {
        let v = LatestValues {
            di_plus: Some(30.0),
            di_minus: Some(10.0),
            adx: Some(27.0),
            ..LatestValues::default()
        };
        assert_eq!(dmi_bracket(&v), DmiBracket::Bullish(AdxStrength::Strong));
        let text = render_dmi(dmi_bracket(&v), &v);
        assert!(text.starts_with("多頭強勢趨勢。DI+（30.00）高於DI-（10.00）"));

        let flat = LatestValues {
            di_plus: Some(0.0),
            di_minus: Some(0.0),
            adx: Some(5.0),
            ..LatestValues::default()
        };
        assert_eq!(dmi_bracket(&flat), DmiBracket::Undecided(AdxStrength::Weak));
    }

    #[test]
    fn kdj_cross_states() {
        let golden = LatestValues { k: Some(60.0), d: Some(50.0), j: Some(80.0), ..LatestValues::default() };
        assert_eq!(kdj_bracket(&golden), KdjBracket::GoldenCross);
        let dead = LatestValues { k: Some(40.0), d: Some(50.0), j: Some(20.0), ..LatestValues::default() };
        assert_eq!(kdj_bracket(&dead), KdjBracket::DeadCross);
        let overbought = LatestValues { k: Some(90.0), d: Some(85.0), ..LatestValues::default() };
        assert_eq!(kdj_bracket(&overbought), KdjBracket::Extreme);
    }

    #[test]
    fn macd_zero_axis() {
        let below = LatestValues { dif: Some(-1.0), dea: Some(-2.0), ..LatestValues::default() };
        assert_eq!(macd_bracket(&below), MacdBracket::Weak);
        let converging = LatestValues { dif: Some(1.0), dea: Some(2.0), ..LatestValues::default() };
        assert_eq!(macd_bracket(&converging), MacdBracket::DeadAboveZero);
    }

    #[test]
    fn keltner_proximity_bands() {
        let v = LatestValues {
            close: 99.0,
            kc_upper: Some(100.0),
            kc_lower: Some(90.0),
            ..LatestValues::default()
        };
        assert_eq!(kc_bracket(&v), KcBracket::NearUpper);
        let inside = LatestValues { close: 95.0, ..v };
        assert_eq!(kc_bracket(&inside), KcBracket::Inside);
        let low = LatestValues { close: 91.0, ..v };
        assert_eq!(kc_bracket(&low), KcBracket::NearLower);
    }

    #[test]
    fn vwma_volume_backing() {
        let mas = MaValues { ma20: Some(100.0), ..MaValues::default() };
        let v = LatestValues {
            close: 110.0,
            vwma5: Some(108.0),
            vwma10: Some(105.0),
            vwma20: Some(100.5),
            ..LatestValues::default()
        };
        assert_eq!(vwma_bracket(&v, &mas), VwmaBracket::BullishBacked);
        let thin = LatestValues { vwma20: Some(100.05), ..v };
        assert_eq!(vwma_bracket(&thin, &mas), VwmaBracket::BullishThin);
        assert_eq!(vwma_bracket(&v, &MaValues::default()), VwmaBracket::Insufficient);
    }

    #[test]
    fn undefined_band_falls_back_to_default_text() {
        let v = LatestValues::default();
        assert_eq!(render_boll(boll_bracket(v.percent_b), &v), "布林帶數據不足，暫無判斷。");
    }
}
