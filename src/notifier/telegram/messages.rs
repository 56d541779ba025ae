// notifier/telegram/messages.rs
//
// HTML message bodies. Pure functions so the layout can be tested offline.

use crate::analyzer::AnalysisResult;
use crate::report::{MarketReport, SymbolReport};
use crate::signals::{CombinedAdvice, SignalBatch, SignalSide};
use crate::utils::format_price;

pub struct SymbolInfo {
    pub name: &'static str,
    pub emoji: &'static str,
}

pub fn symbol_info(symbol: &str) -> SymbolInfo {
    let (name, emoji) = match symbol {
        "BTCUSDT" => ("Bitcoin", "🟠"),
        "ETHUSDT" => ("Ethereum", "🔵"),
        "SOLUSDT" => ("Solana", "🟣"),
        "DOGEUSDT" => ("Dogecoin", "🟡"),
        "XRPUSDT" => ("Ripple", "🔷"),
        "ADAUSDT" => ("Cardano", "🔵"),
        _ => ("", "⚪"),
    };
    SymbolInfo { name, emoji }
}

fn display_name(symbol: &str) -> &str {
    let info = symbol_info(symbol);
    if info.name.is_empty() { symbol } else { info.name }
}

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn header_block(symbol: &str, result: &AnalysisResult) -> String {
    let info = symbol_info(symbol);
    format!(
        "{} <b>{} ({})</b>\n\
         💰 當前價格: <b>{}</b>\n\
         \n\
         📊 <b>價格變化</b>\n\
         • 1小時: <b>{:+.2}%</b>\n\
         • 4小時: <b>{:+.2}%</b>\n\
         • 24小時: <b>{:+.2}%</b>",
        info.emoji,
        display_name(symbol),
        symbol,
        format_price(result.current_price),
        result.change_1h_percent,
        result.change_4h_percent,
        result.change_24h_percent,
    )
}

pub fn format_buy_signal(
    symbol: &str,
    result: &AnalysisResult,
    advice: Option<CombinedAdvice>,
    time: &str,
) -> String {
    let mut message = format!(
        "🚀 <b>買入訊號 BUY SIGNAL</b> 🚀\n\n{}\n\n📈 <b>趨勢分析</b>: {}\n",
        header_block(symbol, result),
        escape_html(&result.current_trend),
    );
    if let Some(advice) = advice {
        message.push_str(&format!("🧭 <b>綜合建議</b>: {}\n", advice.label()));
    }
    message.push_str(&format!(
        "\n🟢 <b>建議操作</b>: 買入 (BUY)\n\
         ⚠️ <b>風險提醒</b>: 請做好風險管理，設定止損\n\
         \n\
         ⏰ 訊號時間: {time} (台北時間)\n\
         \n\
         #買入訊號 #{symbol} #虛擬幣投資"
    ));

    let summary = &result.technical_indicators_summary;
    let advice = &result.analysis_result;
    message.push_str(&format!(
        "\n\n📊 <b>技術指標摘要</b>\n• RSI: {}\n• MACD: {}\n\
         \n💡 <b>入場建議</b>\n{}\n\
         \n🎯 <b>目標價位</b>\n{}\n\
         \n🛡️ <b>止損設定</b>\n{}",
        escape_html(&summary.rsi),
        escape_html(&summary.macd),
        escape_html(&advice.entry_timing),
        escape_html(&advice.target),
        escape_html(&advice.stop_loss),
    ));
    message
}

pub fn format_sell_signal(symbol: &str, result: &AnalysisResult, time: &str) -> String {
    format!(
        "🔴 <b>賣出訊號 SELL SIGNAL</b> 🔴\n\n{}\n\n📉 <b>趨勢分析</b>: {}\n\
         \n🔴 <b>建議操作</b>: 賣出 (SELL)\n\
         ⚠️ <b>風險提醒</b>: 謹慎操作，注意市場變化\n\
         \n⏰ 訊號時間: {time} (台北時間)\n\
         \n#賣出訊號 #{symbol} #虛擬幣投資",
        header_block(symbol, result),
        escape_html(&result.current_trend),
    )
}

fn summary_line(report: &SymbolReport, side: Option<SignalSide>) -> String {
    let signal = match side {
        Some(SignalSide::Buy) => "🟢買入",
        Some(SignalSide::Sell) => "🔴賣出",
        None => "⚪觀望",
    };
    let name = display_name(&report.symbol);
    format!(
        "• <b>{}</b>: {} ({:+.2}%) {}\n",
        name,
        format_price(report.ticker.last_price),
        report.ticker.price_change_percent,
        signal
    )
}

pub fn format_market_summary(report: &MarketReport, batch: &SignalBatch<'_>, time: &str) -> String {
    let mut message = format!("📊 <b>虛擬幣市場總覽</b> 📊\n\n⏰ 更新時間: {time} (台北時間)\n\n");
    for symbol_report in report.reports() {
        message.push_str(&summary_line(symbol_report, batch.side_of(&symbol_report.symbol)));
    }
    message.push_str(&format!(
        "\n📈 <b>信號統計</b>\n\
         🟢 買入信號: {} 個\n\
         🔴 賣出信號: {} 個\n\
         ⚪ 觀望信號: {} 個\n\
         \n#市場總覽 #虛擬幣投資 #技術分析",
        batch.buy.len(),
        batch.sell.len(),
        batch.neutral.len()
    ));
    message
}

/// Short per-symbol view used by the `/report` command.
pub fn format_symbol_brief(symbol: &str, payload: &serde_json::Value, analyzed_at: &str) -> String {
    let text = |key: &str| payload.get(key).and_then(|v| v.as_str()).unwrap_or("N/A").to_string();
    let number = |key: &str| payload.get(key).and_then(|v| v.as_f64());

    let mut message = format!("{} <b>{} ({})</b>\n", symbol_info(symbol).emoji, display_name(symbol), symbol);
    if let Some(price) = number("current_price") {
        message.push_str(&format!("💰 {}", format_price(price)));
        if let Some(change) = number("24hr_change_percent") {
            message.push_str(&format!(" ({change:+.2}%)"));
        }
        message.push('\n');
    }
    message.push_str(&format!("📈 {}: {}\n", text("trend_type"), escape_html(&text("current_trend"))));
    if let Some(advice) = payload.get("combined_advice").and_then(|v| v.as_str()) {
        message.push_str(&format!("🧭 {advice}\n"));
    }
    if let Some(fields) = payload.as_object() {
        let signals: Vec<String> = fields
            .iter()
            .filter_map(|(key, value)| Some(format!("{} {}", key.strip_prefix("signal_")?, value.as_str()?)))
            .collect();
        if !signals.is_empty() {
            message.push_str(&format!("🚦 {}\n", signals.join(" | ")));
        }
    }
    if let Some(direction) = payload.pointer("/analysis_result/方向").and_then(|v| v.as_str()) {
        message.push_str(&format!("💡 {}\n", escape_html(direction)));
    }
    message.push_str(&format!("⏰ {analyzed_at}"));
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Analyzer, TrendAnalyzer};
    use crate::config::SignalConfig;
    use crate::indicators::test_support::{candles_from_closes, linear};
    use crate::model::TickerSnapshot;
    use crate::report::TimeframeAnalysis;
    use crate::signals::partition;
    use std::collections::BTreeMap;

    fn rising() -> (TickerSnapshot, AnalysisResult) {
        let ticker = TickerSnapshot {
            last_price: 1500.0,
            price_change_percent: 3.5,
            volume: 10.0,
        };
        let result = TrendAnalyzer::default()
            .analyze(candles_from_closes(&linear(130, 1000.0, 1500.0), 1000.0), &ticker)
            .unwrap();
        (ticker, result)
    }

    #[test]
    fn buy_message_layout() {
        let (_, result) = rising();
        let text = format_buy_signal("BTCUSDT", &result, Some(CombinedAdvice::ClearBullish), "2024-01-01 08:00:00");
        assert!(text.starts_with("🚀 <b>買入訊號 BUY SIGNAL</b> 🚀\n\n🟠 <b>Bitcoin (BTCUSDT)</b>"));
        assert!(text.contains("💰 當前價格: <b>$1,500.00</b>"));
        assert!(text.contains("• 24小時: <b>+3.50%</b>"));
        assert!(text.contains("🧭 <b>綜合建議</b>: 明確看多"));
        assert!(text.contains("#買入訊號 #BTCUSDT #虛擬幣投資"));
        assert!(text.contains("🛡️ <b>止損設定</b>\nS1: "));
    }

    #[test]
    fn sell_message_for_unknown_symbol_uses_raw_name() {
        let (_, result) = rising();
        let text = format_sell_signal("PEPEUSDT", &result, "t");
        assert!(text.contains("⚪ <b>PEPEUSDT (PEPEUSDT)</b>"));
        assert!(text.contains("🔴 <b>建議操作</b>: 賣出 (SELL)"));
    }

    #[test]
    fn summary_counts_signals() {
        let (ticker, result) = rising();
        let mut timeframes = BTreeMap::new();
        timeframes.insert("1h".to_string(), TimeframeAnalysis::Analyzed(Box::new(result)));
        let report = MarketReport::new(vec![SymbolReport::new("ETHUSDT", ticker, "1h", None, timeframes)]);
        let batch = partition(&report, &SignalConfig::default());

        let text = format_market_summary(&report, &batch, "t");
        assert!(text.contains("• <b>Ethereum</b>: $1,500.00 (+3.50%) 🟢買入\n"));
        assert!(text.contains("🟢 買入信號: 1 個"));
        assert!(text.contains("⚪ 觀望信號: 0 個"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("a<b & c>d"), "a&lt;b &amp; c&gt;d");
    }

    #[test]
    fn brief_reads_payload() {
        let payload = serde_json::json!({
            "current_price": 0.5,
            "24hr_change_percent": -2.0,
            "trend_type": "空頭",
            "current_trend": "空頭排列，趨勢偏空(一般)",
            "analysis_result": {"方向": "謹慎做空。"}
        });
        let text = format_symbol_brief("XRPUSDT", &payload, "now");
        assert!(text.starts_with("🔷 <b>Ripple (XRPUSDT)</b>\n💰 $0.5000 (-2.00%)\n"));
        assert!(text.contains("📈 空頭: 空頭排列，趨勢偏空(一般)"));
        assert!(text.contains("💡 謹慎做空。"));
    }

    #[test]
    fn brief_lists_timeframe_signals() {
        let payload = serde_json::json!({
            "trend_type": "多頭",
            "signal_1h": "🟢買入",
            "signal_15m": "⚪觀望"
        });
        let text = format_symbol_brief("BTCUSDT", &payload, "now");
        assert!(text.contains("🚦 15m ⚪觀望 | 1h 🟢買入\n"));

        let without = format_symbol_brief("BTCUSDT", &serde_json::json!({}), "now");
        assert!(!without.contains("🚦"));
    }
}
