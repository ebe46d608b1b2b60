// src/notify/mod.rs
pub mod telegram;

pub use telegram::TelegramNotifier;

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMethod {
    Telegram,
    Stdout,
}

/// The `notify` section of config.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub method: NotifyMethod,
}

/// The configured outbound transport. Resolved once at startup so missing
/// credentials surface before any fetch or state mutation.
pub enum Notifier {
    Telegram(TelegramNotifier),
    Stdout,
}

impl Notifier {
    pub fn from_config(config: &NotifyConfig) -> Result<Self> {
        match config.method {
            NotifyMethod::Telegram => Ok(Self::Telegram(TelegramNotifier::from_env()?)),
            NotifyMethod::Stdout => Ok(Self::Stdout),
        }
    }

    pub async fn send(&self, text: &str) -> Result<()> {
        match self {
            Self::Telegram(telegram) => telegram.send(text).await,
            Self::Stdout => {
                println!("{}", text);
                Ok(())
            }
        }
    }
}
