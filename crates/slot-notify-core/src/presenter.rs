//! Presenter seam between the controller and a messaging transport.

use crate::composer::{BroadcastMessage, MediaRef};
use crate::controller::Prompt;
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a transport while delivering output.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Sending to the broadcast channel failed
    #[error("Broadcast error: {0}")]
    Broadcast(String),
    /// Updating the interacting user's control message failed
    #[error("Present error: {0}")]
    Present(String),
}

/// Output side of the interaction controller.
///
/// Implementations own the platform client and the fixed broadcast
/// destination; the controller only decides what to send.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Send the broadcast text to the fixed channel.
    async fn broadcast_text(&self, message: &BroadcastMessage) -> Result<(), DeliveryError>;

    /// Send broadcast media to the fixed channel.
    async fn broadcast_media(&self, media: &MediaRef) -> Result<(), DeliveryError>;

    /// Replace the control message with the given prompt and options.
    async fn present(&self, prompt: &Prompt) -> Result<(), DeliveryError>;
}
