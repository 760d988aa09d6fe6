#![deny(missing_docs)]
//! Slot notifier core library.
//!
//! Per-user selection state, the option catalog, the two-step interaction
//! controller and the broadcast composer. Transport crates plug in through
//! the [`presenter::Presenter`] trait.

/// Static status and city options.
pub mod catalog;
/// Broadcast message composition.
pub mod composer;
/// Configuration management.
pub mod config;
/// Two-step interaction state machine.
pub mod controller;
/// Transport seam for broadcasts and UI updates.
pub mod presenter;
/// Per-user selection storage.
pub mod store;

pub use catalog::{OptionItem, Status};
pub use composer::{BroadcastMessage, Clock, MediaRef, SystemClock};
pub use controller::{CallbackEvent, Completion, Controller, Outcome, Prompt, Screen};
pub use presenter::{DeliveryError, Presenter};
pub use store::SelectionStore;
