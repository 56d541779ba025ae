pub mod command_handler;
pub mod listener;
pub mod messages;
pub mod sender;

use crate::config::AppConfig;
use crate::model::NotifyError;
use crate::report::MarketReport;
use crate::signals::{partition, SignalSide};
use crate::storage::SqliteStorage;
use crate::utils::taipei_now;
use reqwest::Client;
use std::sync::atomic::AtomicI64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};
use tokio::time::sleep;
use tracing::{info, warn};

const TELEGRAM_API: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    pub bot_token: String,
    pub chat_id: i64,
    pub client: Client,
    pub offset: Arc<AtomicI64>,
    pub storage: Arc<Mutex<SqliteStorage>>,
    pub config: Arc<AppConfig>,
    pub latest_report: Arc<Mutex<MarketReport>>,
    pub start_time: Instant,
    pub refresh_notify: Arc<Notify>,
}

impl TelegramNotifier {
    pub fn new(
        config: Arc<AppConfig>,
        storage: Arc<Mutex<SqliteStorage>>,
        latest_report: Arc<Mutex<MarketReport>>,
        refresh_notify: Arc<Notify>,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::ApiError(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            bot_token: config.telegram_bot_token.clone(),
            chat_id: config.telegram_chat_id,
            client,
            offset: Arc::new(AtomicI64::new(0)),
            storage,
            config,
            latest_report,
            start_time: Instant::now(),
            refresh_notify,
        })
    }

    pub fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", TELEGRAM_API, self.bot_token, method)
    }

    pub async fn notify_text(&self, text: &str) -> Result<(), NotifyError> {
        sender::send_text(self, text).await
    }

    pub async fn notify_html(&self, html: &str) -> Result<(), NotifyError> {
        sender::send_html(self, html).await
    }

    pub async fn listen_for_commands(&self) {
        listener::listen_for_commands(self).await;
    }

    pub async fn set_my_commands(&self) -> Result<(), NotifyError> {
        let commands = serde_json::json!({
            "commands": [
                { "command": "ping", "description": "Check connection" },
                { "command": "status", "description": "Current trend per symbol" },
                { "command": "help", "description": "Command list" },
                { "command": "summary", "description": "Market summary" },
                { "command": "config", "description": "Current configuration" },
                { "command": "refresh", "description": "Run analysis now" },
                { "command": "uptime", "description": "Service uptime" },
                { "command": "report", "description": "Latest analysis for one symbol" }
            ]
        });
        let response = self
            .client
            .post(self.api_url("setMyCommands"))
            .json(&commands)
            .send()
            .await
            .map_err(|e| NotifyError::ApiError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(NotifyError::ApiError(format!("setMyCommands: {}", response.status())));
        }
        Ok(())
    }

    pub fn spawn_listener(notifier: Arc<TelegramNotifier>) {
        tokio::spawn(async move {
            info!("▶️ Starting Telegram listener...");
            notifier.listen_for_commands().await;
            info!("🛑 Telegram listener ended.");
        });
    }

    /// Sends the market summary, then buy and sell signals not yet sent
    /// within the cooldown.
    pub async fn dispatch_signals(&self, report: &MarketReport) {
        let signals = &self.config.signals;
        let batch = partition(report, signals);
        info!(
            "📊 Signals: {} buy, {} sell, {} neutral",
            batch.buy.len(),
            batch.sell.len(),
            batch.neutral.len()
        );
        let time = taipei_now();

        if signals.send_market_summary {
            if let Err(e) = self.notify_html(&messages::format_market_summary(report, &batch, &time)).await {
                warn!("❌ Market summary failed: {:?}", e);
            }
        }

        let queue = [
            (SignalSide::Buy, signals.send_buy_signals, &batch.buy),
            (SignalSide::Sell, signals.send_sell_signals, &batch.sell),
        ];
        let cooldown = signals.cooldown();

        for (side, enabled, reports) in queue {
            if !enabled {
                continue;
            }
            for symbol_report in reports.iter() {
                let Some(result) = symbol_report.primary().and_then(|p| p.result()) else {
                    continue;
                };
                let key = side.key(&symbol_report.symbol);

                let should_notify = match self.storage.lock().await.should_notify(&key, cooldown) {
                    Ok(flag) => flag,
                    Err(e) => {
                        warn!("❌ Error checking notification status for {}: {:?}", key, e);
                        false
                    }
                };
                if !should_notify {
                    info!("✅ {} already notified within cooldown", key);
                    continue;
                }

                let message = match side {
                    SignalSide::Buy => messages::format_buy_signal(
                        &symbol_report.symbol,
                        result,
                        symbol_report.combined_advice,
                        &time,
                    ),
                    SignalSide::Sell => messages::format_sell_signal(&symbol_report.symbol, result, &time),
                };

                info!("📤 Sending {} signal for {}", side.as_str(), symbol_report.symbol);
                match self.notify_html(&message).await {
                    Ok(()) => {
                        if let Err(e) = self.storage.lock().await.mark_notified(&key) {
                            warn!("❌ Mark notified failed: {:?}", e);
                        }
                    }
                    Err(e) => warn!("❌ Error sending {}: {:?}", key, e),
                }

                if signals.message_interval_ms > 0 {
                    sleep(Duration::from_millis(signals.message_interval_ms)).await;
                }
            }
        }
    }
}
