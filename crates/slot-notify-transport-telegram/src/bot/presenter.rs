use crate::bot::resilient::{
    edit_message_resilient, send_animation_resilient, send_message_resilient,
};
use crate::bot::views::{prompt_keyboard, render_broadcast_html};
use async_trait::async_trait;
use slot_notify_core::{BroadcastMessage, DeliveryError, MediaRef, Presenter, Prompt};
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ParseMode};
use tracing::debug;

/// Telegram delivery for one callback: broadcasts go to the configured
/// channel, prompts replace the control message the button was pressed on.
pub struct TelegramPresenter {
    bot: Bot,
    channel: ChatId,
    control: Option<(ChatId, MessageId)>,
}

impl TelegramPresenter {
    /// Create a presenter. `control` is `None` when the button belongs to an
    /// inline-mode message, which has no chat to edit; prompts are then dropped.
    pub const fn new(bot: Bot, channel: ChatId, control: Option<(ChatId, MessageId)>) -> Self {
        Self {
            bot,
            channel,
            control,
        }
    }
}

#[async_trait]
impl Presenter for TelegramPresenter {
    async fn broadcast_text(&self, message: &BroadcastMessage) -> Result<(), DeliveryError> {
        send_message_resilient(
            &self.bot,
            self.channel,
            render_broadcast_html(message),
            Some(ParseMode::Html),
            None,
        )
        .await
        .map(|_| ())
        .map_err(|e| DeliveryError::Broadcast(e.to_string()))
    }

    async fn broadcast_media(&self, media: &MediaRef) -> Result<(), DeliveryError> {
        match media {
            MediaRef::Animation(url) => send_animation_resilient(&self.bot, self.channel, url)
                .await
                .map(|_| ())
                .map_err(|e| DeliveryError::Broadcast(e.to_string())),
        }
    }

    async fn present(&self, prompt: &Prompt) -> Result<(), DeliveryError> {
        let Some((chat_id, msg_id)) = self.control else {
            debug!("No accessible control message; skipping prompt update");
            return Ok(());
        };

        match edit_message_resilient(
            &self.bot,
            chat_id,
            msg_id,
            prompt.screen.title(),
            prompt_keyboard(prompt),
        )
        .await
        {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                debug!("Control message already shows {:?}", prompt.screen);
                Ok(())
            }
            Err(e) => Err(DeliveryError::Present(e.to_string())),
        }
    }
}
