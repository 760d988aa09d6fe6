//! Resilient messaging utilities with automatic retry for Telegram API operations.
//!
//! Wrappers around Bot API calls that retry transient failures using
//! exponential backoff with jitter.
//!
//! # Usage
//!
//! ```ignore
//! use slot_notify_transport_telegram::bot::resilient::send_message_resilient;
//!
//! let msg = send_message_resilient(&bot, chat_id, "Hello!", Some(ParseMode::Html), None).await?;
//! ```

use anyhow::Result;
use slot_notify_core::config::{
    TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
};
use std::future::Future;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, InputFile, Message, MessageId, ParseMode};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::{debug, warn};
use url::Url;

const ERROR_NOT_MODIFIED: &str = "message is not modified";
const ERROR_NOT_FOUND: &str = "message to delete not found";

/// Retry a Telegram operation with exponential backoff and jitter.
///
/// # Errors
///
/// Returns the last error once all retries are exhausted.
pub async fn retry_telegram_operation<F, Fut, T>(operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter)
        .take(TELEGRAM_API_MAX_RETRIES);

    Retry::spawn(retry_strategy, operation).await.map_err(|e| {
        warn!(
            "Telegram API operation failed after {} attempts: {}",
            TELEGRAM_API_MAX_RETRIES, e
        );
        e
    })
}

/// Send a message with automatic retry on network failures.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    parse_mode: Option<ParseMode>,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<Message> {
    let text = text.into();
    retry_telegram_operation(|| async {
        let mut req = bot.send_message(chat_id, text.clone());
        if let Some(pm) = parse_mode {
            req = req.parse_mode(pm);
        }
        if let Some(kb) = keyboard.clone() {
            req = req.reply_markup(kb);
        }
        req.await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
    })
    .await
}

/// Send an animation referenced by URL, with retry.
///
/// # Errors
///
/// Returns an error if the URL is invalid or all retries fail.
pub async fn send_animation_resilient(bot: &Bot, chat_id: ChatId, url: &str) -> Result<Message> {
    let url = Url::parse(url)?;
    retry_telegram_operation(|| async {
        bot.send_animation(chat_id, InputFile::url(url.clone()))
            .await
            .map_err(|e| anyhow::anyhow!("Telegram animation error: {e}"))
    })
    .await
}

/// Run an edit with retry, treating "message is not modified" as a
/// completed no-op instead of a transient failure.
///
/// Returns `Ok(None)` when the target already showed the requested content.
///
/// # Errors
///
/// Returns the last error once all retries are exhausted.
pub async fn retry_edit_operation<F, Fut, T>(mut operation: F) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_telegram_operation(|| {
        let attempt = operation();
        async move {
            match attempt.await {
                Ok(value) => Ok(Some(value)),
                Err(e) if is_not_modified(&e) => {
                    debug!("Message update skipped: message is not modified");
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        }
    })
    .await
}

/// Replace the text and inline keyboard of a message, with retry.
///
/// Returns `Ok(None)` if the message already had this content.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn edit_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    msg_id: MessageId,
    text: impl Into<String>,
    keyboard: InlineKeyboardMarkup,
) -> Result<Option<Message>> {
    let text = text.into();
    retry_edit_operation(|| async {
        bot.edit_message_text(chat_id, msg_id, text.clone())
            .reply_markup(keyboard.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Telegram edit error: {e}"))
    })
    .await
}

/// Whether an edit failed only because the content was already identical.
#[must_use]
pub fn is_not_modified(error: &anyhow::Error) -> bool {
    error.to_string().contains(ERROR_NOT_MODIFIED)
}

/// Delete a message, treating "already gone" as success.
///
/// Returns `true` if the message no longer exists afterwards.
pub async fn delete_message_safe(bot: &Bot, chat_id: ChatId, msg_id: MessageId) -> bool {
    match bot.delete_message(chat_id, msg_id).await {
        Ok(_) => true,
        Err(e) => {
            let err_msg = e.to_string();
            if err_msg.contains(ERROR_NOT_FOUND) {
                debug!("Message {} already deleted: {err_msg}", msg_id.0);
                true
            } else {
                warn!("Could not delete message {} in chat {}: {e}", msg_id.0, chat_id);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() -> Result<()> {
        let attempts = AtomicUsize::new(0);
        let value = retry_telegram_operation(|| async {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow::anyhow!("network hiccup"))
            } else {
                Ok(7)
            }
        })
        .await?;

        assert_eq!(value, 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_not_modified_edit_is_not_retried() -> Result<()> {
        let attempts = AtomicUsize::new(0);
        let started = std::time::Instant::now();
        let edited: Option<()> = retry_edit_operation(|| async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!(
                "Telegram edit error: Bad Request: message is not modified"
            ))
        })
        .await?;

        assert!(edited.is_none());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS));
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_retries_other_failures() -> Result<()> {
        let attempts = AtomicUsize::new(0);
        let edited = retry_edit_operation(|| async {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow::anyhow!("Telegram edit error: timed out"))
            } else {
                Ok(42)
            }
        })
        .await?;

        assert_eq!(edited, Some(42));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[test]
    fn test_not_modified_detection() {
        let err = anyhow::anyhow!(
            "Telegram edit error: Bad Request: message is not modified: specified new message content"
        );
        assert!(is_not_modified(&err));
        assert!(!is_not_modified(&anyhow::anyhow!("Forbidden: bot was blocked")));
    }
}
