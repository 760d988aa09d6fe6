/// Command and callback query handlers
pub mod handlers;
/// Control panel message tracking
pub mod panel;
/// `Presenter` implementation backed by the Bot API
pub mod presenter;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;
/// View layer for UI components (keyboards, messages)
pub mod views;

pub use panel::{PanelChannel, PanelRegistry};
pub use presenter::TelegramPresenter;
