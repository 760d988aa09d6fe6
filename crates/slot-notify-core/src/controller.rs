//! Interaction controller
//!
//! Two-step state machine driven by button presses:
//!
//! | from            | event               | effect                                   | to              |
//! |-----------------|---------------------|------------------------------------------|-----------------|
//! | any             | status (in catalog) | store status                             | city selection  |
//! | any             | city (in catalog)   | compose + broadcast with stored status   | status selection|
//! | any             | anything else       | none                                     | unchanged       |
//!
//! The store is mutated before any output is delivered. Delivery failures are
//! reported to the caller and never roll the store back.

use crate::catalog::{self, OptionItem, CITY_PREFIX, STATUS_PREFIX};
use crate::composer::{self, BroadcastMessage, Clock, SystemClock};
use crate::presenter::{DeliveryError, Presenter};
use crate::store::SelectionStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Screen shown on the control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Awaiting a status choice. Initial state.
    StatusSelection,
    /// Awaiting a city choice.
    CitySelection,
}

impl Screen {
    /// Caption displayed above the options.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::StatusSelection => "Select Slot Status:",
            Self::CitySelection => "Select a City:",
        }
    }

    /// Options offered on this screen.
    #[must_use]
    pub fn options(self) -> Vec<OptionItem> {
        match self {
            Self::StatusSelection => catalog::status_options(),
            Self::CitySelection => catalog::city_options(),
        }
    }
}

/// Next UI to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Screen to switch to.
    pub screen: Screen,
    /// Options to render, one per row.
    pub options: Vec<OptionItem>,
}

impl From<Screen> for Prompt {
    fn from(screen: Screen) -> Self {
        Self {
            screen,
            options: screen.options(),
        }
    }
}

/// Result of a city selection: the broadcast plus the reset UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Message for the broadcast channel.
    pub broadcast: BroadcastMessage,
    /// Prompt that resets the control message.
    pub prompt: Prompt,
}

/// Decoded callback payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackEvent<'a> {
    /// Raw status value, not yet validated.
    Status(&'a str),
    /// Raw city value, not yet validated.
    City(&'a str),
    /// Payload without a known prefix.
    Unrecognized,
}

impl<'a> CallbackEvent<'a> {
    /// Splits a callback payload into its event kind and raw value.
    #[must_use]
    pub fn parse(payload: &'a str) -> Self {
        if let Some(raw) = payload.strip_prefix(STATUS_PREFIX) {
            Self::Status(raw)
        } else if let Some(raw) = payload.strip_prefix(CITY_PREFIX) {
            Self::City(raw)
        } else {
            Self::Unrecognized
        }
    }
}

/// What a callback led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A status was stored; the city prompt should be shown.
    Advanced(Prompt),
    /// A city was chosen; a broadcast was composed and the UI resets.
    Completed(Completion),
    /// Malformed or unknown input. Nothing changed.
    Ignored,
}

/// Interaction controller shared by all handlers.
#[derive(Clone)]
pub struct Controller {
    store: SelectionStore,
    clock: Arc<dyn Clock>,
}

impl Controller {
    /// Creates a controller stamping broadcasts with the server local time.
    #[must_use]
    pub fn new(store: SelectionStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Creates a controller with a custom clock.
    #[must_use]
    pub fn with_clock(store: SelectionStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Underlying selection store.
    #[must_use]
    pub const fn store(&self) -> &SelectionStore {
        &self.store
    }

    /// Prompt shown when a session starts. Ignores any stored selection.
    #[must_use]
    pub fn initial_ui(&self, user_id: i64) -> Prompt {
        debug!(user_id, "Presenting initial status selection");
        Prompt::from(Screen::StatusSelection)
    }

    /// Handles a status button. Returns `None` for values outside the catalog.
    pub async fn on_status_event(&self, user_id: i64, raw_value: &str) -> Option<Prompt> {
        let status = catalog::parse_status(raw_value)?;
        self.store.set_status(user_id, status).await;
        Some(Prompt::from(Screen::CitySelection))
    }

    /// Handles a city button. Returns `None` for cities outside the catalog.
    ///
    /// Falls back to [`crate::Status::Unknown`] when the user never picked a
    /// status. Every accepted call composes a fresh broadcast, so redelivered
    /// events broadcast twice.
    pub async fn on_city_event(&self, user_id: i64, raw_value: &str) -> Option<Completion> {
        let city = catalog::parse_city(raw_value)?;
        let status = self.store.get_status(user_id).await;
        let broadcast = composer::compose(status, city, self.clock.now());

        info!(user_id, %status, city, "Selection completed");

        Some(Completion {
            broadcast,
            prompt: Prompt::from(Screen::StatusSelection),
        })
    }

    /// Applies a decoded event without delivering anything.
    pub async fn transition(&self, user_id: i64, event: CallbackEvent<'_>) -> Outcome {
        let outcome = match event {
            CallbackEvent::Status(raw) => self
                .on_status_event(user_id, raw)
                .await
                .map(Outcome::Advanced),
            CallbackEvent::City(raw) => self
                .on_city_event(user_id, raw)
                .await
                .map(Outcome::Completed),
            CallbackEvent::Unrecognized => None,
        };

        outcome.unwrap_or_else(|| {
            debug!(user_id, ?event, "Ignoring unrecognized callback");
            Outcome::Ignored
        })
    }

    /// Routes a raw callback payload and delivers the result.
    ///
    /// Order on completion: broadcast text, broadcast media, then UI reset.
    ///
    /// # Errors
    ///
    /// Returns the first [`DeliveryError`] raised by the presenter. The store
    /// keeps whatever the transition already wrote.
    pub async fn handle_callback<P>(
        &self,
        user_id: i64,
        payload: &str,
        presenter: &P,
    ) -> Result<Outcome, DeliveryError>
    where
        P: Presenter + ?Sized,
    {
        let outcome = self.transition(user_id, CallbackEvent::parse(payload)).await;

        match &outcome {
            Outcome::Advanced(prompt) => presenter.present(prompt).await?,
            Outcome::Completed(completion) => {
                presenter.broadcast_text(&completion.broadcast).await?;
                if let Some(media) = &completion.broadcast.media {
                    presenter.broadcast_media(media).await?;
                }
                presenter.present(&completion.prompt).await?;
            }
            Outcome::Ignored => {}
        }

        Ok(outcome)
    }
}
