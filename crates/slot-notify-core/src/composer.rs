//! Notification composer
//!
//! Turns a completed selection into the message broadcast to the channel.

use crate::catalog::Status;
use chrono::Local;

pub use chrono::NaiveTime;

/// Animation attached to "slot available" broadcasts.
pub const CELEBRATION_GIF_URL: &str = "https://media.giphy.com/media/111ebonMs90YLu/giphy.gif";

/// 12-hour wall clock with seconds and AM/PM marker.
pub const TIMESTAMP_FORMAT: &str = "%I:%M:%S %p";

/// Source of the wall-clock time stamped on broadcasts.
pub trait Clock: Send + Sync {
    /// Current local time of day.
    fn now(&self) -> NaiveTime;
}

/// Server local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Media attached to a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    /// Animated image referenced by URL.
    Animation(String),
}

/// Outbound channel notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    /// Status the message reports. `Unknown` renders like `NotAvailable`.
    pub status: Status,
    /// Selected city.
    pub city: String,
    /// Pre-formatted composition time.
    pub timestamp: String,
    /// Optional media sent after the text.
    pub media: Option<MediaRef>,
}

impl BroadcastMessage {
    /// Leading emoji.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self.status {
            Status::Available => "✅",
            Status::NotAvailable | Status::Unknown => "❌",
        }
    }

    /// Emphasized part of the message.
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match self.status {
            Status::Available => "Slot Available",
            Status::NotAvailable | Status::Unknown => "Slot Not Available",
        }
    }

    /// Message text with `*` marking the emphasized headline.
    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "{} *{}* in {} at {}",
            self.icon(),
            self.headline(),
            self.city,
            self.timestamp
        )
    }
}

/// Builds the broadcast for `status` in `city` at `time`.
#[must_use]
pub fn compose(status: Status, city: &str, time: NaiveTime) -> BroadcastMessage {
    let media = match status {
        Status::Available => Some(MediaRef::Animation(CELEBRATION_GIF_URL.to_string())),
        Status::NotAvailable | Status::Unknown => None,
    };

    BroadcastMessage {
        status,
        city: city.to_string(),
        timestamp: format_timestamp(time),
        media,
    }
}

/// Formats `time` as e.g. `03:04:05 PM`.
#[must_use]
pub fn format_timestamp(time: NaiveTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn afternoon() -> NaiveTime {
        NaiveTime::from_hms_opt(15, 4, 5).unwrap_or_default()
    }

    #[test]
    fn test_available_uses_affirmative_template_with_media() {
        let msg = compose(Status::Available, "Mumbai", afternoon());
        insta::assert_snapshot!(msg.text(), @"✅ *Slot Available* in Mumbai at 03:04:05 PM");
        assert_eq!(
            msg.media,
            Some(MediaRef::Animation(CELEBRATION_GIF_URL.to_string()))
        );
    }

    #[test]
    fn test_not_available_has_no_media() {
        let msg = compose(Status::NotAvailable, "Kolkata", afternoon());
        insta::assert_snapshot!(msg.text(), @"❌ *Slot Not Available* in Kolkata at 03:04:05 PM");
        assert!(msg.media.is_none());
    }

    #[test]
    fn test_unknown_falls_back_to_negative_template() {
        let msg = compose(Status::Unknown, "Chennai", afternoon());
        assert_eq!(msg.headline(), "Slot Not Available");
        assert!(msg.media.is_none());
    }

    #[test]
    fn test_timestamp_is_twelve_hour_with_marker() {
        let midnight = NaiveTime::from_hms_opt(0, 0, 9).unwrap_or_default();
        assert_eq!(format_timestamp(midnight), "12:00:09 AM");
        let noon = NaiveTime::from_hms_opt(12, 30, 0).unwrap_or_default();
        assert_eq!(format_timestamp(noon), "12:30:00 PM");
    }
}
