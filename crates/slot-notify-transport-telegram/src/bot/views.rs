//! Keyboards and message formatting for the control panel and broadcasts.

use slot_notify_core::{BroadcastMessage, OptionItem, Prompt};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// One callback button per option, one option per row.
#[must_use]
pub fn options_keyboard(options: &[OptionItem]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(options.iter().map(|option| {
        vec![InlineKeyboardButton::callback(
            option.label.clone(),
            option.value.clone(),
        )]
    }))
}

/// Keyboard for a prompt.
#[must_use]
pub fn prompt_keyboard(prompt: &Prompt) -> InlineKeyboardMarkup {
    options_keyboard(&prompt.options)
}

/// Broadcast text as Telegram HTML with the headline in bold.
#[must_use]
pub fn render_broadcast_html(message: &BroadcastMessage) -> String {
    format!(
        "{} <b>{}</b> in {} at {}",
        message.icon(),
        message.headline(),
        html_escape::encode_text(&message.city),
        message.timestamp
    )
}
