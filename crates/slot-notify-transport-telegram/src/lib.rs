#![deny(missing_docs)]
//! Telegram transport adapter for the slot notifier.

/// Telegram-specific handlers, views and delivery.
pub mod bot;
/// Telegram transport configuration.
pub mod config;
/// HTTP liveness route.
pub mod health;
/// Telegram runtime entrypoint.
pub mod runner;
