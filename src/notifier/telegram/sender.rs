// notifier/telegram/sender.rs

use crate::model::NotifyError;
use crate::notifier::telegram::TelegramNotifier;
use serde_json::json;
use tracing::{debug, warn};

/// Posts a `sendMessage` call. `parse_mode` is omitted for plain text.
pub async fn send_message(
    notifier: &TelegramNotifier,
    text: &str,
    parse_mode: Option<&str>,
) -> Result<(), NotifyError> {
    let url = notifier.api_url("sendMessage");
    let mut payload = json!({
        "chat_id": notifier.chat_id,
        "text": text,
    });
    if let Some(mode) = parse_mode {
        payload["parse_mode"] = json!(mode);
    }

    let response = notifier
        .client
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                warn!("⏳ Telegram unreachable: {}", e);
                NotifyError::Unreachable
            } else {
                NotifyError::ApiError(format!("Send failed: {}", e))
            }
        })?;

    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown".into());
    if !status.is_success() {
        warn!("❌ Telegram API responded [{}]: {}", status, body);
        return Err(NotifyError::ApiError(format!("{status}: {body}")));
    }
    debug!("✅ Telegram response [{}]", status);
    Ok(())
}

pub async fn send_text(notifier: &TelegramNotifier, text: &str) -> Result<(), NotifyError> {
    send_message(notifier, text, None).await
}

pub async fn send_html(notifier: &TelegramNotifier, html: &str) -> Result<(), NotifyError> {
    send_message(notifier, html, Some("HTML")).await
}
