use crate::bot;
use crate::bot::handlers::Command;
use crate::bot::PanelRegistry;
use crate::config::{BotSettings, TransportMode, PANEL_REGISTRY_MAX_SIZE};
use crate::health;
use anyhow::Result;
use slot_notify_core::Controller;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::update_listeners::{webhooks, UpdateListener};
use tracing::{error, info};

/// Run the Telegram transport runtime until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the webhook cannot be configured or its listen
/// address cannot be bound.
pub async fn run_bot(settings: Arc<BotSettings>) -> Result<()> {
    let controller = init_controller(&settings);
    let panels = Arc::new(PanelRegistry::new(PANEL_REGISTRY_MAX_SIZE));
    let bot = Bot::new(settings.telegram.telegram_token.clone());
    let handler = setup_handler();
    let mode = settings.telegram.transport_mode;

    info!(
        "Broadcasting to channel {} ({:?} mode)",
        settings.telegram.channel_id(),
        mode
    );

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![controller, panels, settings.clone()])
        .enable_ctrlc_handler()
        .build();

    match mode {
        TransportMode::Polling => {
            info!("Using long polling for updates.");
            info!("Bot is running...");
            dispatcher.dispatch().await;
        }
        TransportMode::Webhook => {
            let url = settings.telegram.webhook_url()?;
            let addr = settings.telegram.listen_addr();
            let options = webhooks::Options::new(addr, url).drop_pending_updates();
            let (mut listener, stop_flag, webhook_routes) =
                webhooks::axum_to_router(bot, options).await?;
            let stop_token = listener.stop_token();
            let app = webhook_routes.merge(health::router());

            let tcp = tokio::net::TcpListener::bind(addr).await?;
            tokio::spawn(async move {
                if let Err(e) = axum::serve(tcp, app)
                    .with_graceful_shutdown(stop_flag)
                    .await
                {
                    error!("Webhook server error: {e}");
                    stop_token.stop();
                }
            });
            info!("Webhook set, listening on {addr}");
            info!("Bot is running...");
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    Ok(())
}

fn init_controller(settings: &BotSettings) -> Arc<Controller> {
    match settings.core.selection_ttl_secs {
        Some(ttl) if ttl > 0 => info!("Selection store idle TTL: {ttl}s"),
        _ => info!("Selection store without expiry"),
    }
    Arc::new(Controller::new(settings.core.selection_store()))
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    controller: Arc<Controller>,
    panels: Arc<PanelRegistry>,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg, controller, panels).await,
        Command::Ui => bot::handlers::ui(bot, msg, controller, panels).await,
        Command::Help => bot::handlers::help(bot, msg).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    controller: Arc<Controller>,
    settings: Arc<BotSettings>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_callback(bot, q, controller, settings).await {
        error!("Callback handler error: {}", e);
    }
    respond(())
}
