// Trade suggestion block: one template set per trend type, levels from the pivots.
use super::pivots::FibonacciPivots;
use super::trend::TrendType;
use crate::utils::{fmt_opt, pct_change};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSuggestion {
    #[serde(rename = "方向")]
    pub direction: String,
    #[serde(rename = "入場時機")]
    pub entry_timing: String,
    #[serde(rename = "止損設定")]
    pub stop_loss: String,
    #[serde(rename = "目標價位")]
    pub target: String,
}

pub fn suggest(
    trend: TrendType,
    current_price: f64,
    ma20: Option<f64>,
    pivots: &FibonacciPivots,
) -> TradeSuggestion {
    let support = pivots.major_support();
    let resistance = pivots.major_resistance();
    let ma20 = fmt_opt(ma20, 2);

    let (direction, entry_timing) = match trend {
        TrendType::Bullish => (
            format!(
                "積極做多。多頭排列確立，價格站穩關鍵支撐{support:.2}且指標共振偏多，突破{resistance:.2}壓力確認趨勢延續。"
            ),
            format!(
                "激進者：現價{current_price:.2}直接做多，突破{resistance:.2}加倉。穩健者：等待回踩{ma20}（MA20）企穩後進場。"
            ),
        ),
        TrendType::Bearish => (
            format!(
                "謹慎做空。空頭排列明確，價格跌破關鍵支撐{support:.2}且指標共振偏空，反彈至{resistance:.2}壓力可考慮做空。"
            ),
            format!(
                "激進者：現價{current_price:.2}輕倉做空，反彈至{resistance:.2}加倉。穩健者：等待反彈至{ma20}（MA20）阻力後進場。"
            ),
        ),
        TrendType::Tangled => (
            format!(
                "觀望等待。均線糾結狀態，方向不明確，等待突破{resistance:.2}或跌破{support:.2}後再做決策。"
            ),
            format!(
                "激進者：暫時觀望，等待方向選擇。穩健者：突破{resistance:.2}做多或跌破{support:.2}做空。"
            ),
        ),
        TrendType::Ranging => (
            format!(
                "區間操作。震盪整理格局，可在{support:.2}附近做多，{resistance:.2}附近做空，注意控制倉位。"
            ),
            format!(
                "激進者：現價{current_price:.2}可輕倉操作。穩健者：等待接近區間邊界{support:.2}或{resistance:.2}後進場。"
            ),
        ),
    };

    let offset = |level: f64| pct_change(current_price, level);
    TradeSuggestion {
        direction,
        entry_timing,
        stop_loss: format!(
            "S1: {:.2}（{:+.1}%），S2: {:.2}（{:+.1}%），或浮動止損3%以內。",
            pivots.s1,
            offset(pivots.s1),
            pivots.s2,
            offset(pivots.s2)
        ),
        target: format!(
            "R1: {:.2}（{:+.1}%），R2: {:.2}（{:+.1}%）。",
            pivots.r1,
            offset(pivots.r1),
            pivots.r2,
            offset(pivots.r2)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullish_template_uses_levels() {
        let pivots = FibonacciPivots::calculate(110.0, 90.0, 100.0);
        let s = suggest(TrendType::Bullish, 100.0, Some(98.5), &pivots);
        assert!(s.direction.starts_with("積極做多"));
        assert!(s.direction.contains("92.36"));
        assert!(s.direction.contains("107.64"));
        assert!(s.entry_timing.contains("98.50（MA20）"));
        assert_eq!(s.stop_loss, "S1: 92.36（-7.6%），S2: 87.64（-12.4%），或浮動止損3%以內。");
        assert_eq!(s.target, "R1: 107.64（+7.6%），R2: 112.36（+12.4%）。");
    }

    #[test]
    fn each_trend_has_its_own_direction() {
        let pivots = FibonacciPivots::calculate(110.0, 90.0, 100.0);
        let direction = |t| suggest(t, 100.0, None, &pivots).direction;
        assert!(direction(TrendType::Bearish).starts_with("謹慎做空"));
        assert!(direction(TrendType::Tangled).starts_with("觀望等待"));
        assert!(direction(TrendType::Ranging).starts_with("區間操作"));
    }

    #[test]
    fn missing_ma20_renders_placeholder() {
        let pivots = FibonacciPivots::calculate(110.0, 90.0, 100.0);
        let s = suggest(TrendType::Bearish, 100.0, None, &pivots);
        assert!(s.entry_timing.contains("N/A（MA20）"));
    }
}
