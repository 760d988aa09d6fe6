//! Telegram transport settings.

use config::ConfigError;
use serde::{Deserialize, Serialize};
use slot_notify_core::config::CoreSettings;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use teloxide::types::ChatId;
use thiserror::Error;
use url::Url;

/// Default webhook listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Maximum number of chats whose control panel id is remembered.
pub const PANEL_REGISTRY_MAX_SIZE: u64 = 10_000;

/// Errors raised while loading or validating settings at startup.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Underlying configuration source failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// A required value is absent
    #[error("{0} must be set")]
    Missing(&'static str),
    /// A value is present but unusable
    #[error("Invalid {key}: {reason}")]
    Invalid {
        /// Offending key
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// How updates reach the bot.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Telegram pushes updates to `{render_external_url}/{token}`.
    #[default]
    Webhook,
    /// The bot long-polls `getUpdates`.
    Polling,
}

/// Telegram transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramSettings {
    /// Telegram Bot API token. Falls back to `BOT_TOKEN`.
    #[serde(default)]
    pub telegram_token: String,
    /// Chat that receives every broadcast.
    #[serde(default)]
    pub channel_chat_id: i64,
    /// Public base URL the webhook is registered under.
    pub render_external_url: Option<String>,
    /// Update delivery mode.
    #[serde(default)]
    pub transport_mode: TransportMode,
    /// Webhook listen port.
    #[serde(default = "default_port")]
    pub port: u16,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

impl TelegramSettings {
    /// Load and validate settings from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `SettingsError` if loading fails or a required value is missing.
    pub fn new() -> Result<Self, SettingsError> {
        let mut settings: Self = slot_notify_core::config::build_config()?.try_deserialize()?;

        if settings.telegram_token.is_empty() {
            if let Ok(val) = std::env::var("BOT_TOKEN") {
                settings.telegram_token = val;
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Checks that everything the selected mode needs is present.
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid value.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.telegram_token.trim().is_empty() {
            return Err(SettingsError::Missing("TELEGRAM_TOKEN"));
        }
        if self.channel_chat_id == 0 {
            return Err(SettingsError::Missing("CHANNEL_CHAT_ID"));
        }
        if self.transport_mode == TransportMode::Webhook {
            self.webhook_url()?;
        }
        Ok(())
    }

    /// Broadcast destination.
    #[must_use]
    pub const fn channel_id(&self) -> ChatId {
        ChatId(self.channel_chat_id)
    }

    /// Address the webhook listener binds to.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Full webhook URL: the external base forced to https, then `/{token}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or does not parse.
    pub fn webhook_url(&self) -> Result<Url, SettingsError> {
        let base = self
            .render_external_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(SettingsError::Missing("RENDER_EXTERNAL_URL"))?;

        let base = base
            .strip_prefix("http://")
            .map_or_else(|| base.to_string(), |rest| format!("https://{rest}"));

        Url::parse(&format!("{}/{}", base.trim_end_matches('/'), self.telegram_token)).map_err(
            |e| SettingsError::Invalid {
                key: "RENDER_EXTERNAL_URL",
                reason: e.to_string(),
            },
        )
    }
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Core settings (selection store policy).
    pub core: Arc<CoreSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(core: CoreSettings, telegram: TelegramSettings) -> Self {
        Self {
            core: Arc::new(core),
            telegram: Arc::new(telegram),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TelegramSettings {
        TelegramSettings {
            telegram_token: "123456789:token".to_string(),
            channel_chat_id: -100_123,
            render_external_url: Some("http://slots.example.com/".to_string()),
            transport_mode: TransportMode::Webhook,
            port: DEFAULT_PORT,
        }
    }

    #[test]
    fn test_webhook_url_upgrades_scheme_and_appends_token() -> Result<(), SettingsError> {
        let url = settings().webhook_url()?;
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.as_str(), "https://slots.example.com/123456789:token");
        Ok(())
    }

    #[test]
    fn test_missing_values_are_reported() {
        let mut s = settings();
        s.telegram_token = String::new();
        assert!(matches!(
            s.validate(),
            Err(SettingsError::Missing("TELEGRAM_TOKEN"))
        ));

        let mut s = settings();
        s.channel_chat_id = 0;
        assert!(matches!(
            s.validate(),
            Err(SettingsError::Missing("CHANNEL_CHAT_ID"))
        ));

        let mut s = settings();
        s.render_external_url = None;
        assert!(matches!(
            s.validate(),
            Err(SettingsError::Missing("RENDER_EXTERNAL_URL"))
        ));
    }

    #[test]
    fn test_polling_mode_does_not_need_url() {
        let mut s = settings();
        s.render_external_url = None;
        s.transport_mode = TransportMode::Polling;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_listen_addr_uses_port() {
        let mut s = settings();
        s.port = 8443;
        assert_eq!(s.listen_addr().to_string(), "0.0.0.0:8443");
        assert_eq!(s.channel_id(), ChatId(-100_123));
    }
}
