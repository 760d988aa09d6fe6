//! Control panel tracking
//!
//! Remembers the last status-selection panel sent to each chat so `/ui`
//! can remove it before posting a fresh one.

use crate::bot::resilient::{delete_message_safe, send_message_resilient};
use crate::bot::views::prompt_keyboard;
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use slot_notify_core::Prompt;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};
use tracing::info;

/// Where control panels are posted and removed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PanelChannel: Send + Sync {
    /// Posts `prompt` as a new panel and returns its message id.
    async fn send_panel(&self, chat_id: ChatId, prompt: &Prompt) -> Result<MessageId>;

    /// Removes a panel. Returns `true` if the message no longer exists.
    async fn delete_panel(&self, chat_id: ChatId, msg_id: MessageId) -> bool;
}

#[async_trait]
impl PanelChannel for Bot {
    async fn send_panel(&self, chat_id: ChatId, prompt: &Prompt) -> Result<MessageId> {
        let sent = send_message_resilient(
            self,
            chat_id,
            prompt.screen.title(),
            None,
            Some(prompt_keyboard(prompt)),
        )
        .await?;
        Ok(sent.id)
    }

    async fn delete_panel(&self, chat_id: ChatId, msg_id: MessageId) -> bool {
        delete_message_safe(self, chat_id, msg_id).await
    }
}

/// Last control panel message per chat.
#[derive(Clone)]
pub struct PanelRegistry {
    cache: Cache<ChatId, MessageId>,
}

impl PanelRegistry {
    /// Creates a registry holding at most `max_capacity` chats.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Records `msg_id` as the current panel of `chat_id`.
    pub async fn remember(&self, chat_id: ChatId, msg_id: MessageId) {
        self.cache.insert(chat_id, msg_id).await;
    }

    /// Removes and returns the tracked panel of `chat_id`.
    pub async fn take(&self, chat_id: ChatId) -> Option<MessageId> {
        self.cache.remove(&chat_id).await
    }

    #[cfg(test)]
    async fn current(&self, chat_id: ChatId) -> Option<MessageId> {
        self.cache.get(&chat_id).await
    }

    /// Sends `prompt` as the new panel of `chat_id` and tracks it.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel cannot be sent; tracking is unchanged.
    pub async fn post<C: PanelChannel + ?Sized>(
        &self,
        channel: &C,
        chat_id: ChatId,
        prompt: &Prompt,
    ) -> Result<MessageId> {
        let msg_id = channel.send_panel(chat_id, prompt).await?;
        self.remember(chat_id, msg_id).await;
        info!("Sent control panel {} in chat {}", msg_id.0, chat_id);
        Ok(msg_id)
    }

    /// Deletes the tracked panel of `chat_id`, if any, then posts a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the new panel cannot be sent.
    pub async fn replace<C: PanelChannel + ?Sized>(
        &self,
        channel: &C,
        chat_id: ChatId,
        prompt: &Prompt,
    ) -> Result<MessageId> {
        if let Some(old) = self.take(chat_id).await {
            if channel.delete_panel(chat_id, old).await {
                info!("Deleted old control panel {} in chat {}", old.0, chat_id);
            }
        }
        self.post(channel, chat_id, prompt).await
    }
}
