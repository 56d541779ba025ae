// notifier/telegram/command_handler.rs

use crate::notifier::telegram::messages::{format_market_summary, format_symbol_brief};
use crate::notifier::telegram::TelegramNotifier;
use crate::normalizer::normalize_symbol;
use crate::signals::partition;
use crate::utils::{format_taipei, taipei_now};
use tracing::{info, warn};

const HELP: &str = "📋 可用指令:\n\
    /ping - 檢查連線\n\
    /status - 各幣種目前趨勢\n\
    /help - 指令列表\n\
    /summary - 市場總覽\n\
    /config - 目前設定\n\
    /refresh - 立即重新分析\n\
    /uptime - 運行時間\n\
    /report SYMBOL - 單一幣種分析";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Status,
    Help,
    Summary,
    Config,
    Refresh,
    Uptime,
    Report(Option<String>),
    Unknown(String),
}

/// Parses `/cmd[@bot] [args]`.
pub fn parse_command(text: &str) -> Command {
    let mut parts = text.split_whitespace();
    let head = parts.next().unwrap_or_default();
    let name = head.split('@').next().unwrap_or_default();
    match name {
        "/ping" => Command::Ping,
        "/status" => Command::Status,
        "/help" | "/start" => Command::Help,
        "/summary" => Command::Summary,
        "/config" => Command::Config,
        "/refresh" => Command::Refresh,
        "/uptime" => Command::Uptime,
        "/report" => Command::Report(parts.next().map(normalize_symbol)),
        _ => Command::Unknown(head.to_string()),
    }
}

pub fn format_uptime(secs: u64) -> String {
    format!("⏱ 運行時間: {:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Handles an incoming command and replies in the chat.
pub async fn handle_command(command_text: &str, notifier: &TelegramNotifier) {
    let command = parse_command(command_text);
    info!("Handling command: {:?}", command);

    let reply = match command {
        Command::Ping => Reply::Text("✅ 我在線上！".into()),
        Command::Help => Reply::Text(HELP.into()),
        Command::Status => status_reply(notifier).await,
        Command::Summary => summary_reply(notifier).await,
        Command::Config => Reply::Text(config_reply(notifier)),
        Command::Refresh => {
            info!("/refresh command received, triggering refresh...");
            notifier.refresh_notify.notify_one();
            Reply::Text("🔄 已觸發重新分析。".into())
        }
        Command::Uptime => Reply::Text(format_uptime(notifier.start_time.elapsed().as_secs())),
        Command::Report(Some(symbol)) => report_reply(notifier, &symbol).await,
        Command::Report(None) => Reply::Text("用法: /report BTCUSDT".into()),
        Command::Unknown(_) => Reply::Text("🤖 未知指令，輸入 /help 查看指令列表。".into()),
    };

    let sent = match &reply {
        Reply::Text(text) => notifier.notify_text(text).await,
        Reply::Html(html) => notifier.notify_html(html).await,
    };
    if let Err(e) = sent {
        warn!("{} reply error: {:?}", command_text, e);
    }
}

enum Reply {
    Text(String),
    Html(String),
}

async fn status_reply(notifier: &TelegramNotifier) -> Reply {
    match notifier.storage.lock().await.list_trends() {
        Ok(trends) if !trends.is_empty() => {
            let mut msg = String::from("📊 目前趨勢:\n");
            for (symbol, trend) in trends {
                msg.push_str(&format!("🔹 {symbol} - {trend}\n"));
            }
            Reply::Text(msg)
        }
        Ok(_) => Reply::Text("📭 尚無分析結果，等待下一次檢查。".into()),
        Err(e) => Reply::Text(format!("❌ Error: {e}")),
    }
}

async fn summary_reply(notifier: &TelegramNotifier) -> Reply {
    let latest = notifier.latest_report.lock().await;
    if latest.is_empty() {
        return Reply::Text("📭 尚無分析結果，等待下一次檢查。".into());
    }
    let batch = partition(&latest, &notifier.config.signals);
    Reply::Html(format_market_summary(&latest, &batch, &taipei_now()))
}

fn config_reply(notifier: &TelegramNotifier) -> String {
    let config = &notifier.config;
    format!(
        "⚙️ 目前設定:\n🔸 幣種: {}\n🔸 時間框架: {}\n🔸 K線數量: {}\n🔸 檢查間隔: {}s\n🔸 DMI: {}\n🔸 買入/賣出門檻: {:+.2}% / {:+.2}%",
        config.symbols.join(", "),
        config.intervals.join(", "),
        config.kline_limit,
        config.check_interval_seconds,
        if config.analysis.enable_dmi { "on" } else { "off" },
        config.signals.buy_signal_threshold,
        config.signals.sell_signal_threshold,
    )
}

async fn report_reply(notifier: &TelegramNotifier, symbol: &str) -> Reply {
    match notifier.storage.lock().await.get_report(symbol) {
        Ok(Some(stored)) => Reply::Html(format_symbol_brief(
            &stored.symbol,
            &stored.payload,
            &format_taipei(stored.analyzed_at),
        )),
        Ok(None) => Reply::Text(format!("📭 找不到 {symbol} 的分析結果。")),
        Err(e) => Reply::Text(format!("❌ Error: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("/ping"), Command::Ping);
        assert_eq!(parse_command("/status@kline_bot"), Command::Status);
        assert_eq!(parse_command("/report ethusdt"), Command::Report(Some("ETHUSDT".into())));
        assert_eq!(parse_command("/report"), Command::Report(None));
        assert_eq!(parse_command("hello"), Command::Unknown("hello".into()));
        assert_eq!(parse_command(""), Command::Unknown(String::new()));
    }

    #[test]
    fn uptime_format() {
        assert_eq!(format_uptime(3723), "⏱ 運行時間: 01:02:03");
    }
}
