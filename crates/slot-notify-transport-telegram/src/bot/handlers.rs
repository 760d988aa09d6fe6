use crate::bot::panel::PanelRegistry;
use crate::bot::presenter::TelegramPresenter;
use crate::config::BotSettings;
use anyhow::Result;
use slot_notify_core::{Controller, Outcome};
use std::sync::Arc;
use teloxide::{prelude::*, types::CallbackQuery, utils::command::BotCommands};
use tracing::{debug, info, warn};

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Supported commands for the bot
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the status selection panel
    #[command(description = "Show the slot status panel.")]
    Start,
    /// Replace the tracked panel with a fresh one
    #[command(description = "Repost the slot status panel.")]
    Ui,
    /// List commands
    #[command(description = "Show this help.")]
    Help,
}

/// Start handler
///
/// # Errors
///
/// Returns an error if the panel cannot be sent.
pub async fn start(
    bot: Bot,
    msg: Message,
    controller: Arc<Controller>,
    panels: Arc<PanelRegistry>,
) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    info!("User {user_id} initiated /start command.");

    let prompt = controller.initial_ui(user_id);
    panels.post(&bot, msg.chat.id, &prompt).await?;
    Ok(())
}

/// `/ui` handler: deletes the previously tracked panel, then sends a new one.
///
/// # Errors
///
/// Returns an error if the new panel cannot be sent.
pub async fn ui(
    bot: Bot,
    msg: Message,
    controller: Arc<Controller>,
    panels: Arc<PanelRegistry>,
) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    info!("User {user_id} requested a fresh panel with /ui.");

    let prompt = controller.initial_ui(user_id);
    panels.replace(&bot, msg.chat.id, &prompt).await?;
    Ok(())
}

/// Help handler
///
/// # Errors
///
/// Returns an error if the message cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Callback query handler: routes the button payload through the controller.
///
/// # Errors
///
/// Returns an error if a broadcast or the control message update fails.
/// The selection already recorded for the user is kept.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    controller: Arc<Controller>,
    settings: Arc<BotSettings>,
) -> Result<()> {
    // Stop the client-side spinner regardless of what the payload is
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback query: {e}");
    }

    let Some(data) = q.data.as_deref() else {
        debug!("Callback query without data from user {}", q.from.id);
        return Ok(());
    };

    let user_id = q.from.id.0.cast_signed();
    let control = q.message.as_ref().map(|m| (m.chat().id, m.id()));
    let presenter = TelegramPresenter::new(bot, settings.telegram.channel_id(), control);

    match controller.handle_callback(user_id, data, &presenter).await? {
        Outcome::Completed(completion) => info!(
            user_id,
            city = %completion.broadcast.city,
            status = %completion.broadcast.status,
            tracked_users = controller.store().entry_count(),
            "Broadcast sent to channel {}",
            settings.telegram.channel_id()
        ),
        Outcome::Advanced(_) => debug!(user_id, "Status stored, awaiting city"),
        Outcome::Ignored => debug!(user_id, data, "Ignored callback payload"),
    }

    Ok(())
}
