// src/notify/telegram.rs
use anyhow::{Context, Result};
use tracing::debug;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT_SECS: u64 = 15;

/// Telegram Bot API transport - one sendMessage POST per report chunk.
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow::anyhow!("TELEGRAM_BOT_TOKEN environment variable not set"))?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .map_err(|_| anyhow::anyhow!("TELEGRAM_CHAT_ID environment variable not set"))?;

        Self::new(token, chat_id)
    }

    pub fn new(token: String, chat_id: String) -> Result<Self> {
        if token.is_empty() || chat_id.is_empty() {
            anyhow::bail!("Telegram credentials must not be empty");
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token,
            chat_id,
        })
    }

    /// Delivery failure propagates to the caller; a chunk that did not reach
    /// Telegram must never be recorded as sent.
    pub async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API_BASE, self.token);
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("Failed to call Telegram sendMessage")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Telegram sendMessage returned status {}: {}", status, body);
        }

        debug!("Delivered {} chars to Telegram chat", text.chars().count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_credentials_are_rejected() {
        assert!(TelegramNotifier::new(String::new(), "12345".to_string()).is_err());
        assert!(TelegramNotifier::new("token".to_string(), String::new()).is_err());
        assert!(TelegramNotifier::new("token".to_string(), "12345".to_string()).is_ok());
    }
}
