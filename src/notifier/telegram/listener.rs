// notifier/telegram/listener.rs

use crate::notifier::telegram::command_handler::handle_command;
use crate::notifier::telegram::TelegramNotifier;
use serde::Deserialize;
use std::sync::atomic::Ordering;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

const POLL_TIMEOUT_SECS: u64 = 25;

#[derive(Debug, Deserialize)]
struct TelegramApiResponse {
    result: Vec<TelegramUpdate>,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

/// Long-polls `getUpdates` and dispatches commands from the configured chat.
pub async fn listen_for_commands(notifier: &TelegramNotifier) {
    let url = notifier.api_url("getUpdates");
    loop {
        let offset = notifier.offset.load(Ordering::SeqCst);
        let response = notifier
            .client
            .get(&url)
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 5))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", POLL_TIMEOUT_SECS.to_string()),
            ])
            .send()
            .await;

        match response {
            Ok(resp) => match resp.json::<TelegramApiResponse>().await {
                Ok(api_response) => {
                    for update in api_response.result {
                        if let Some(message) = &update.message {
                            if message.chat.id != notifier.chat_id {
                                debug!("Ignoring message from chat {}", message.chat.id);
                            } else if let Some(text) = message.text.as_deref() {
                                handle_command(text, notifier).await;
                            }
                        }
                        notifier.offset.store(update.update_id + 1, Ordering::SeqCst);
                    }
                }
                Err(e) => warn!("getUpdates decode error: {}", e),
            },
            Err(e) => warn!("getUpdates failed: {}", e),
        }
        sleep(Duration::from_secs(1)).await;
    }
}
