use dotenvy::dotenv;
use regex::Regex;
use slot_notify_core::config::CoreSettings;
use slot_notify_transport_telegram::config::{BotSettings, TelegramSettings};
use slot_notify_transport_telegram::runner::run_bot;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt::MakeWriter, prelude::*, EnvFilter};

const TOKEN_PLACEHOLDER: &str = "[TELEGRAM_TOKEN]";
const DEFAULT_LOG_FILTER: &str = "slot_notify_core=info,slot_notify_transport_telegram=info,slot_notify_telegram_bot=info,teloxide=warn,hyper=warn,reqwest=warn,axum=warn";

/// Hides bot tokens in log lines. The webhook path and Bot API URLs both
/// embed the token, so every line passes through here before reaching stderr.
struct TokenMask {
    configured: Option<String>,
    rules: Vec<(Regex, &'static str)>,
}

impl TokenMask {
    fn new(configured: Option<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            configured: configured.filter(|t| !t.is_empty()),
            rules: vec![
                (
                    Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
                    "$1[TELEGRAM_TOKEN]$3",
                ),
                (
                    Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
                    TOKEN_PLACEHOLDER,
                ),
                (
                    Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
                    "$1[TELEGRAM_TOKEN]",
                ),
            ],
        })
    }

    fn apply(&self, line: &str) -> String {
        let mut masked = match &self.configured {
            Some(token) => line.replace(token.as_str(), TOKEN_PLACEHOLDER),
            None => line.to_owned(),
        };
        for (pattern, replacement) in &self.rules {
            masked = pattern.replace_all(&masked, *replacement).into_owned();
        }
        masked
    }
}

/// One formatted event on its way to the sink.
struct MaskedLine<W: Write> {
    sink: W,
    mask: Arc<TokenMask>,
}

impl<W: Write> Write for MaskedLine<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let masked = self.mask.apply(&String::from_utf8_lossy(buf));
        self.sink.write_all(masked.as_bytes())?;
        // Callers track progress against their own buffer
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

#[derive(Clone)]
struct MaskedStderr {
    mask: Arc<TokenMask>,
}

impl<'a> MakeWriter<'a> for MaskedStderr {
    type Writer = MaskedLine<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskedLine {
            sink: io::stderr(),
            mask: Arc::clone(&self.mask),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Masking must be ready before the first log line
    let configured_token = std::env::var("TELEGRAM_TOKEN")
        .or_else(|_| std::env::var("BOT_TOKEN"))
        .ok();
    let mask = Arc::new(TokenMask::new(configured_token).map_err(|e| {
        eprintln!("Failed to compile token patterns: {e}");
        e
    })?);

    init_logging(mask);

    info!("Starting slot notifier bot...");

    let settings = init_settings();

    if let Err(e) = run_bot(settings).await {
        error!("Bot stopped: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(mask: Arc<TokenMask>) {
    let debug_mode = debug_mode_enabled(std::env::var("DEBUG_MODE").ok().as_deref());
    let fallback = if debug_mode { "debug" } else { DEFAULT_LOG_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(MaskedStderr { mask }))
        .init();
}

fn debug_mode_enabled(value: Option<&str>) -> bool {
    matches!(value, Some("true" | "1"))
}

fn init_settings() -> Arc<BotSettings> {
    let core_settings = match CoreSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load core configuration: {}", e);
            std::process::exit(1);
        }
    };
    let telegram_settings = match TelegramSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load telegram configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully.");
    Arc::new(BotSettings::new(core_settings, telegram_settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TOKEN: &str = "123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw";

    #[test]
    fn test_masks_api_url_token() -> Result<(), regex::Error> {
        let mask = TokenMask::new(None)?;
        let line = format!("POST https://api.telegram.org/bot{SAMPLE_TOKEN}/sendMessage failed");
        let masked = mask.apply(&line);
        assert!(!masked.contains("AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw"));
        assert!(masked.contains("/bot[TELEGRAM_TOKEN]/"));
        Ok(())
    }

    #[test]
    fn test_masks_bare_token() -> Result<(), regex::Error> {
        let mask = TokenMask::new(None)?;
        let line = "webhook path /123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw2";
        assert_eq!(mask.apply(line), "webhook path /[TELEGRAM_TOKEN]");
        Ok(())
    }

    #[test]
    fn test_masks_configured_token_of_any_shape() -> Result<(), regex::Error> {
        let mask = TokenMask::new(Some("42:short".to_string()))?;
        let line = "Webhook set to https://slots.example.com/42:short";
        assert_eq!(
            mask.apply(line),
            "Webhook set to https://slots.example.com/[TELEGRAM_TOKEN]"
        );
        Ok(())
    }

    #[test]
    fn test_empty_configured_token_is_ignored() -> Result<(), regex::Error> {
        let mask = TokenMask::new(Some(String::new()))?;
        assert_eq!(mask.apply("Bot is running..."), "Bot is running...");
        Ok(())
    }

    #[test]
    fn test_leaves_ordinary_text_alone() -> Result<(), regex::Error> {
        let mask = TokenMask::new(None)?;
        let line = "Slot Available in Mumbai at 03:04:05 PM";
        assert_eq!(mask.apply(line), line);
        Ok(())
    }

    #[test]
    fn test_masked_line_reports_full_write() -> Result<(), Box<dyn std::error::Error>> {
        let mut line = MaskedLine {
            sink: Vec::new(),
            mask: Arc::new(TokenMask::new(None)?),
        };
        let event = format!("sending via bot{SAMPLE_TOKEN}\n");

        let written = line.write(event.as_bytes())?;

        assert_eq!(written, event.len());
        assert_eq!(String::from_utf8(line.sink)?, "sending via bot123456789:[TELEGRAM_TOKEN]\n");
        Ok(())
    }

    #[test]
    fn test_debug_mode_switch() {
        assert!(debug_mode_enabled(Some("true")));
        assert!(debug_mode_enabled(Some("1")));
        assert!(!debug_mode_enabled(Some("yes")));
        assert!(!debug_mode_enabled(None));
    }
}
